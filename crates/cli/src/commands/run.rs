// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `pj run --input <glob> --output <dir>` - Score a batch of records

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use pj_adapters::{CommandJudge, HttpJudge, HttpJudgeConfig, Judge, TracedJudge};
use pj_engine::{paths, BatchDeps, BatchError, BatchSummary, Orchestrator};
use pj_storage::{CheckpointStore, ErrorJournal};
use serde::Serialize;

use crate::config::{ConfigFile, JudgeSettings, Overrides, Settings};
use crate::exit_error::{ExitError, EXIT_CHECKPOINT, EXIT_INTERRUPTED};
use crate::output::{self, OutputFormat};
use crate::table::Table;

#[derive(Args)]
pub struct RunArgs {
    /// Input files to score (glob pattern, repeatable)
    #[arg(short = 'i', long = "input", required = true, value_name = "GLOB")]
    pub inputs: Vec<String>,

    /// Directory for the checkpoint, error journal, log, and aggregate
    #[arg(long = "output", value_name = "DIR", default_value = "pj-output")]
    pub output: PathBuf,

    /// Maximum concurrent judge calls
    #[arg(short = 'w', long = "workers")]
    pub workers: Option<usize>,

    /// Completed items between checkpoint writes
    #[arg(long = "checkpoint-interval")]
    pub checkpoint_interval: Option<usize>,

    /// Retries per item after the first attempt
    #[arg(long = "max-retries")]
    pub max_retries: Option<u32>,

    /// Skip items already processed by an earlier run (default)
    #[arg(long, overrides_with = "no_resume")]
    pub resume: bool,

    /// Ignore any existing checkpoint and start over
    #[arg(long = "no-resume", overrides_with = "resume")]
    pub no_resume: bool,

    /// Don't print progress lines
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

impl RunArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            workers: self.workers,
            checkpoint_interval: self.checkpoint_interval,
            max_retries: self.max_retries,
        }
    }

    pub fn resume(&self) -> bool {
        !self.no_resume
    }
}

/// JSON shape of the run report
#[derive(Serialize)]
struct RunReport<'a> {
    #[serde(flatten)]
    summary: &'a BatchSummary,
    aggregate_path: Option<PathBuf>,
}

pub async fn handle(args: RunArgs, config: Option<&Path>, format: OutputFormat) -> Result<()> {
    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("failed to create output directory {}", args.output.display()))?;
    let _log_guard = crate::logging::init(Some(&paths::log_path(&args.output)))?;

    let settings = ConfigFile::load(config)?.resolve(&args.overrides())?;
    let items = crate::inputs::collect(&args.inputs)?;
    tracing::info!(
        items = items.len(),
        output = %args.output.display(),
        "collected inputs"
    );

    let gateway = settings.gateway.clone();
    let judge = build_judge(&settings)?;
    let orchestrator = Orchestrator::new(
        BatchDeps {
            judge,
            gateway: settings.gateway,
            store: CheckpointStore::new(paths::checkpoint_path(&args.output)),
            journal: ErrorJournal::new(paths::journal_dir(&args.output)),
        },
        settings.batch,
    )?;

    let cancel = orchestrator.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("interrupt received, letting in-flight items finish");
            cancel.cancel();
        }
    });
    let progress = (!args.quiet).then(|| output::spawn_progress(orchestrator.subscribe()));

    let result = orchestrator.run(items, args.resume()).await;
    if let Some(progress) = progress {
        progress.abort();
    }

    let summary = match result {
        Ok(summary) => summary,
        Err(BatchError::Checkpoint(e)) => {
            return Err(ExitError::new(
                EXIT_CHECKPOINT,
                format!(
                    "checkpoint store failed, run aborted: {e}\nsee {} for details",
                    orchestrator.journal_dir().display()
                ),
            )
            .into());
        }
        Err(e) => return Err(e.into()),
    };

    let aggregate_path = if summary.interrupted {
        None
    } else {
        let path = paths::aggregate_path(&args.output);
        let json = serde_json::to_string_pretty(&summary.aggregate)?;
        gateway.write_text(&path, &format!("{json}\n"))?;
        Some(path)
    };

    match format {
        OutputFormat::Text => print!(
            "{}",
            output::format_summary(
                &summary,
                aggregate_path.as_deref(),
                Table::new(output::aggregate_columns()),
            )
        ),
        OutputFormat::Json => output::print_json(&RunReport {
            summary: &summary,
            aggregate_path,
        })?,
    }

    if summary.interrupted {
        return Err(ExitError::new(EXIT_INTERRUPTED, String::new()).into());
    }
    Ok(())
}

/// Construct the configured judge backend, wrapped for tracing.
fn build_judge(settings: &Settings) -> Result<Box<dyn Judge>> {
    let judge: Box<dyn Judge> = match &settings.judge {
        JudgeSettings::Http {
            endpoint,
            model,
            api_key_env,
            prompt,
            temperature,
        } => {
            let api_key = crate::env::api_key(api_key_env);
            if api_key.is_none() {
                tracing::warn!(var = %api_key_env, "no judge API key set, sending unauthenticated requests");
            }
            let judge = HttpJudge::new(HttpJudgeConfig {
                endpoint: endpoint.clone(),
                model: model.clone(),
                api_key,
                prompt: prompt.clone(),
                dimensions: settings.batch.aggregate.dimensions.clone(),
                scale: settings.batch.aggregate.scale,
                temperature: *temperature,
                timeout: settings.batch.item_timeout,
            })
            .context("failed to build HTTP judge client")?;
            Box::new(TracedJudge::new(judge))
        }
        JudgeSettings::Command { program, args } => Box::new(TracedJudge::new(
            CommandJudge::new(program.clone(), args.clone())
                .with_timeout(settings.batch.item_timeout),
        )),
    };
    Ok(judge)
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
