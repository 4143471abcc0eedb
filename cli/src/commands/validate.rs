// Copyright (c) 2026 Costwise
// SPDX-License-Identifier: AGPL-3.0

//! `costwise validate` - check a manifest without executing anything.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use costwise_core::application::validation;
use costwise_core::infrastructure::manifest::PipelineManifest;

#[derive(Args)]
pub struct ValidateArgs {
    /// Pipeline manifest (YAML)
    #[arg(value_name = "FILE")]
    manifest: PathBuf,
}

pub fn execute(args: ValidateArgs) -> Result<()> {
    let manifest = PipelineManifest::parse_file(&args.manifest)?;
    let tasks = manifest.task_specs();
    validation::validate(&tasks)?;

    println!(
        "{} {} ({} task{})",
        "OK".green().bold(),
        manifest.metadata.name,
        tasks.len(),
        if tasks.len() == 1 { "" } else { "s" }
    );
    Ok(())
}
