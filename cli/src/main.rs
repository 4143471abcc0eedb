// Copyright (c) 2026 Costwise
// SPDX-License-Identifier: AGPL-3.0

//! # Costwise CLI
//!
//! The `costwise` binary drives the cloud cost analysis pipeline from the
//! command line.
//!
//! ## Commands
//!
//! - `costwise run` - Execute a pipeline and print the run report as JSON
//! - `costwise validate` - Validate a pipeline manifest without running it
//! - `costwise agents` - List the bundled agents and their required inputs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

mod commands;

use commands::{AgentsArgs, RunArgs, ValidateArgs};

/// Costwise - Multi-agent cloud cost analysis
#[derive(Parser)]
#[command(name = "costwise")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "COSTWISE_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a pipeline
    #[command(name = "run")]
    Run(RunArgs),

    /// Validate a pipeline manifest
    #[command(name = "validate")]
    Validate(ValidateArgs),

    /// List bundled agents
    #[command(name = "agents")]
    Agents(AgentsArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Run(args) => commands::run::execute(args).await,
        Commands::Validate(args) => commands::validate::execute(args),
        Commands::Agents(args) => commands::agents::execute(args),
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    Ok(())
}
