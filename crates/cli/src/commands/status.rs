// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `pj status --output <dir>` - Show the checkpoint of a batch

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use clap::Args;
use pj_engine::{paths, ScoreAggregator};
use pj_storage::CheckpointStore;
use serde_json::json;

use crate::config::{ConfigFile, Overrides};
use crate::output::{self, OutputFormat};
use crate::table::Table;

#[derive(Args)]
pub struct StatusArgs {
    /// Batch output directory
    #[arg(long = "output", value_name = "DIR", default_value = "pj-output")]
    pub output: PathBuf,
}

pub fn handle(args: StatusArgs, config: Option<&Path>, format: OutputFormat) -> Result<()> {
    let store = CheckpointStore::new(paths::checkpoint_path(&args.output));
    let checkpoint = store
        .read()?
        .ok_or_else(|| anyhow!("no checkpoint found at {}", store.path().display()))?;

    // Finalize with the configured scale so empty dimensions report its midpoint
    let settings = ConfigFile::load(config)?.resolve(&Overrides::default())?;
    let aggregate =
        ScoreAggregator::from_snapshot(settings.batch.aggregate, checkpoint.aggregate_snapshot.clone())
            .finalize();

    match format {
        OutputFormat::Text => print!(
            "{}",
            output::format_status(&checkpoint, &aggregate, Table::new(output::aggregate_columns()))
        ),
        OutputFormat::Json => output::print_json(&json!({
            "checkpoint": checkpoint,
            "aggregate": aggregate,
        }))?,
    }
    Ok(())
}
