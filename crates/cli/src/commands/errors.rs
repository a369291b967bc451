// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `pj errors --output <dir> [--since <date>] [--until <date>]` - List journaled failures

use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use clap::Args;
use pj_engine::paths;
use pj_storage::ErrorJournal;

use crate::output::{self, OutputFormat};
use crate::table::Table;

/// Default look-back window when `--since` is absent.
const DEFAULT_WINDOW_DAYS: i64 = 7;

#[derive(Args)]
pub struct ErrorsArgs {
    /// Batch output directory
    #[arg(long = "output", value_name = "DIR", default_value = "pj-output")]
    pub output: PathBuf,

    /// Earliest entry to show (YYYY-MM-DD or RFC 3339, default 7 days ago)
    #[arg(long, value_parser = parse_since)]
    pub since: Option<DateTime<Utc>>,

    /// Latest entry to show (YYYY-MM-DD or RFC 3339, default now)
    #[arg(long, value_parser = parse_until)]
    pub until: Option<DateTime<Utc>>,

    /// Only show entries of this kind (e.g. transient_judge)
    #[arg(long)]
    pub kind: Option<String>,
}

/// A bare date starts at midnight.
fn parse_since(s: &str) -> Result<DateTime<Utc>, String> {
    parse_bound(s, NaiveTime::MIN)
}

/// A bare date covers the whole day.
fn parse_until(s: &str) -> Result<DateTime<Utc>, String> {
    let last = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    parse_bound(s, last)
}

fn parse_bound(s: &str, time: NaiveTime) -> Result<DateTime<Utc>, String> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_time(time).and_utc());
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| format!("expected YYYY-MM-DD or an RFC 3339 timestamp, got {s:?}"))
}

pub fn handle(args: ErrorsArgs, format: OutputFormat) -> Result<()> {
    let until = args.until.unwrap_or_else(Utc::now);
    let since = args
        .since
        .unwrap_or_else(|| until - Duration::days(DEFAULT_WINDOW_DAYS));

    let journal = ErrorJournal::new(paths::journal_dir(&args.output));
    let mut entries = journal.read_range(since, until)?;
    if let Some(kind) = &args.kind {
        entries.retain(|e| &e.error_kind == kind);
    }

    match format {
        OutputFormat::Text => {
            if entries.is_empty() {
                eprintln!(
                    "No errors journaled in {} between {} and {}",
                    journal.dir().display(),
                    since.format("%Y-%m-%d %H:%M"),
                    until.format("%Y-%m-%d %H:%M")
                );
            } else {
                print!(
                    "{}",
                    output::format_journal(&entries, Table::new(output::journal_columns()))
                );
            }
        }
        OutputFormat::Json => output::print_json(&entries)?,
    }
    Ok(())
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;
