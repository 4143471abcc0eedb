// Copyright (c) 2026 Costwise
// SPDX-License-Identifier: AGPL-3.0

//! `costwise agents` - list the bundled agents.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use costwise_agents::{ArchitectureReaderAgent, CostSimulatorAgent, EfficiencyAnalyzerAgent};
use costwise_core::Agent;

#[derive(Args)]
pub struct AgentsArgs {}

pub fn execute(_args: AgentsArgs) -> Result<()> {
    let agents: Vec<Box<dyn Agent>> = vec![
        Box::new(ArchitectureReaderAgent::new()),
        Box::new(EfficiencyAnalyzerAgent::new()),
        Box::new(CostSimulatorAgent::new()),
    ];

    for agent in &agents {
        println!("{} ({})", agent.name().bold(), agent.id());
        println!("  {}", agent.description());
        let required = agent.required_inputs();
        if required.is_empty() {
            println!("  requires: {}", "none".dimmed());
        } else {
            println!("  requires: {}", required.join(", "));
        }
    }
    Ok(())
}
