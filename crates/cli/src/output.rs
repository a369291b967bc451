// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::color;
use crate::table::{Column, Table};
use clap::ValueEnum;
use pj_core::OutcomeKind;
use pj_engine::{BatchSummary, DimensionSummary, Progress};
use pj_storage::{Checkpoint, JournalEntry};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::Path;
use tokio::sync::watch;
use tokio::task::JoinHandle;

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Format a duration in milliseconds (e.g. "850ms", "12.3s", "4m05s")
pub fn format_elapsed_ms(ms: u64) -> String {
    if ms < 1_000 {
        format!("{ms}ms")
    } else if ms < 60_000 {
        format!("{:.1}s", ms as f64 / 1_000.0)
    } else {
        let secs = ms / 1_000;
        format!("{}m{:02}s", secs / 60, secs % 60)
    }
}

/// One-line progress report, e.g. "[7/10] 6 succeeded, 1 failed, 2 running"
pub fn format_progress(progress: &Progress) -> String {
    let done = progress.skipped + progress.completed;
    let mut line = format!(
        "[{done}/{}] {} succeeded, {} failed",
        progress.total, progress.succeeded, progress.failed
    );
    if progress.skipped > 0 {
        let _ = write!(line, ", {} skipped", progress.skipped);
    }
    if progress.in_flight > 0 {
        let _ = write!(line, ", {} running", progress.in_flight);
    }
    line
}

/// Print a progress line to stderr each time another item completes.
pub fn spawn_progress(mut rx: watch::Receiver<Progress>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut last_completed = 0;
        while rx.changed().await.is_ok() {
            let progress = *rx.borrow_and_update();
            if progress.completed > last_completed {
                last_completed = progress.completed;
                eprintln!("{}", color::context(&format_progress(&progress)));
            }
        }
    })
}

/// Dimension statistics as a table.
pub fn format_aggregate(aggregate: &BTreeMap<String, DimensionSummary>, mut table: Table) -> String {
    for (dim, summary) in aggregate {
        table.row(vec![
            dim.clone(),
            format!("{:.2}", summary.mean),
            format!("{:.2}", summary.weighted_mean),
            summary.count.to_string(),
            format!("{:.1}", summary.min),
            format!("{:.1}", summary.max),
        ]);
    }
    table.render()
}

pub fn aggregate_columns() -> Vec<Column> {
    vec![
        Column::left("DIMENSION"),
        Column::right("MEAN"),
        Column::right("WEIGHTED"),
        Column::right("N"),
        Column::right("MIN"),
        Column::right("MAX"),
    ]
}

/// End-of-run report.
pub fn format_summary(summary: &BatchSummary, aggregate_path: Option<&Path>, table: Table) -> String {
    let mut out = String::new();
    let verb = if summary.interrupted {
        color::status("interrupted")
    } else {
        color::status("completed")
    };
    let _ = writeln!(
        out,
        "Run {} {} in {}",
        summary.run_id.short(8),
        verb,
        format_elapsed_ms(summary.elapsed_ms)
    );
    let _ = writeln!(out, "  total:       {}", summary.total);
    let _ = writeln!(out, "  succeeded:   {}", summary.succeeded);
    let _ = writeln!(
        out,
        "  failed:      {} ({} retryable, {} permanent)",
        summary.failed(),
        summary.failed_retryable,
        summary.failed_permanent
    );
    let _ = writeln!(out, "  skipped:     {}", summary.skipped);
    if summary.interrupted {
        let _ = writeln!(out, "  unsettled:   {}", summary.unsettled());
    }
    let _ = writeln!(out, "  checkpoints: {}", summary.checkpoint_writes);
    let _ = writeln!(
        out,
        "Error journal: {} ({} new entries)",
        summary.journal_dir.display(),
        summary.journal_entries
    );
    if let Some(path) = aggregate_path {
        let _ = writeln!(out, "Aggregate: {}", path.display());
    }
    let _ = writeln!(out);
    out.push_str(&format_aggregate(&summary.aggregate, table));
    out
}

/// `pj status` report for a checkpoint.
pub fn format_status(
    checkpoint: &Checkpoint,
    aggregate: &BTreeMap<String, DimensionSummary>,
    table: Table,
) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Run {} (checkpoint v{}, updated {})",
        checkpoint.run_id.short(8),
        checkpoint.version,
        checkpoint.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(out, "  processed:   {}", checkpoint.processed_keys.len());
    let _ = writeln!(out, "  cursor:      {}", checkpoint.cursor_index);
    for kind in [
        OutcomeKind::Succeeded,
        OutcomeKind::FailedRetryable,
        OutcomeKind::FailedPermanent,
    ] {
        let label = format!("{kind}:");
        let _ = writeln!(out, "  {label:<12} {}", checkpoint.count(kind));
    }
    let _ = writeln!(out);
    out.push_str(&format_aggregate(aggregate, table));
    out
}

/// Journal entries as a table, oldest first.
pub fn format_journal(entries: &[JournalEntry], mut table: Table) -> String {
    for entry in entries {
        let key = entry
            .context
            .get("key")
            .and_then(|v| v.as_str())
            .unwrap_or("-")
            .to_string();
        table.row(vec![
            entry.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            entry.error_kind.clone(),
            key,
            entry.message.clone(),
        ]);
    }
    table.render()
}

pub fn journal_columns() -> Vec<Column> {
    vec![
        Column::muted("TIME"),
        Column::left("KIND"),
        Column::left("KEY").with_max(40),
        Column::left("MESSAGE"),
    ]
}
