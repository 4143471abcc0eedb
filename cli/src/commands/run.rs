// Copyright (c) 2026 Costwise
// SPDX-License-Identifier: AGPL-3.0

//! `costwise run` - execute a pipeline and emit the run report as JSON.

use anyhow::{bail, Context, Result};
use clap::Args;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use costwise_agents::{ArchitectureReaderAgent, CostSimulatorAgent, EfficiencyAnalyzerAgent};
use costwise_core::infrastructure::manifest::PipelineManifest;
use costwise_core::{AgentId, Orchestrator, Payload, TaskSpec, SEED_INPUT_ID};

#[derive(Args)]
pub struct RunArgs {
    /// Pipeline manifest (YAML); omit to run the default three-stage pipeline
    #[arg(short, long, value_name = "FILE")]
    manifest: Option<PathBuf>,

    /// Seed input as a JSON object file
    #[arg(short, long, value_name = "FILE")]
    seed: Option<PathBuf>,

    /// Currency code for cost simulation output
    #[arg(long, default_value = "USD")]
    currency: String,

    /// Pretty-print the run report
    #[arg(long)]
    pretty: bool,
}

pub async fn execute(args: RunArgs) -> Result<()> {
    let mut orchestrator = Orchestrator::new();
    orchestrator.register_agent(Arc::new(ArchitectureReaderAgent::new()))?;
    orchestrator.register_agent(Arc::new(EfficiencyAnalyzerAgent::new()))?;
    orchestrator.register_agent(Arc::new(CostSimulatorAgent::with_currency(&args.currency)))?;

    match &args.manifest {
        Some(path) => {
            let manifest = PipelineManifest::parse_file(path)?;
            info!(pipeline = %manifest.metadata.name, "loaded manifest");
            orchestrator.load_manifest(&manifest)?;
        }
        None => {
            for task in default_pipeline() {
                orchestrator.add_task_spec(task)?;
            }
        }
    }

    let seed = match &args.seed {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read seed file {}", path.display()))?;
            let payload: Payload = serde_json::from_str(&text)
                .with_context(|| format!("seed file {} is not a JSON object", path.display()))?;
            Some(payload)
        }
        None => None,
    };

    let report = orchestrator.execute(seed).await?;
    let rendered = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{rendered}");

    if !report.is_completed() {
        bail!(
            "pipeline failed{}",
            report
                .failed_task
                .as_ref()
                .map(|id| format!(" at task '{id}'"))
                .unwrap_or_default()
        );
    }
    Ok(())
}

/// Reader feeds analyzer, and both feed the simulator via passthrough merge.
fn default_pipeline() -> Vec<TaskSpec> {
    let seed = AgentId::from(SEED_INPUT_ID);
    let reader = AgentId::from("architecture_reader");
    let analyzer = AgentId::from("efficiency_analyzer");
    let simulator = AgentId::from("cost_simulator");

    vec![
        TaskSpec::new(reader.clone(), vec![seed], HashMap::new()),
        TaskSpec::new(analyzer.clone(), vec![reader.clone()], HashMap::new()),
        TaskSpec::new(simulator, vec![reader, analyzer], HashMap::new()),
    ]
}
