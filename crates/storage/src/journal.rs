// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only error journal, one JSONL file per calendar day (UTC).
//!
//! Layout: `<dir>/errors-YYYY-MM-DD.jsonl`, one self-contained JSON object
//! per line. Lines are only ever appended, so a crash can at worst leave a
//! truncated final line, which readers skip.
//!
//! The journal is independent of the checkpoint: it stays readable even when
//! batch state is lost or corrupt.

use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("journal I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("journal serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One recorded failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub timestamp: DateTime<Utc>,
    pub error_kind: String,
    pub message: String,
    /// Rendered `source()` chain of the error, outermost first
    #[serde(default)]
    pub stack_context: Vec<String>,
    #[serde(default)]
    pub context: BTreeMap<String, serde_json::Value>,
}

impl JournalEntry {
    /// Build an entry from an error value, capturing its source chain.
    pub fn from_error(
        error_kind: impl Into<String>,
        error: &(dyn std::error::Error + 'static),
        context: BTreeMap<String, serde_json::Value>,
    ) -> Self {
        let mut stack_context = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            stack_context.push(cause.to_string());
            source = cause.source();
        }
        Self {
            timestamp: Utc::now(),
            error_kind: error_kind.into(),
            message: error.to_string(),
            stack_context,
            context,
        }
    }
}

/// Where a journal entry ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogLocation {
    File(PathBuf),
    /// The journal file was unwritable; the entry went to stderr and tracing
    Fallback,
}

/// Append-only, date-partitioned failure log.
pub struct ErrorJournal {
    dir: PathBuf,
    // Serializes appends from concurrent workers so lines never interleave
    write_lock: Mutex<()>,
}

impl ErrorJournal {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            write_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the journal file for a calendar day.
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("errors-{}.jsonl", date.format("%Y-%m-%d")))
    }

    /// Record a failure. Never fails: when the journal cannot be written the
    /// entry is routed to the fallback diagnostic channel instead.
    pub fn log(
        &self,
        error_kind: &str,
        error: &(dyn std::error::Error + 'static),
        context: BTreeMap<String, serde_json::Value>,
    ) -> LogLocation {
        let entry = JournalEntry::from_error(error_kind, error, context);
        self.record(&entry)
    }

    /// Append a prepared entry, falling back to stderr on failure.
    pub fn record(&self, entry: &JournalEntry) -> LogLocation {
        match self.append(entry) {
            Ok(path) => LogLocation::File(path),
            Err(e) => {
                let line = serde_json::to_string(entry)
                    .unwrap_or_else(|_| format!("{}: {}", entry.error_kind, entry.message));
                tracing::error!(
                    dir = %self.dir.display(),
                    error = %e,
                    entry = %line,
                    "error journal unwritable, entry kept in diagnostics only"
                );
                eprintln!("pj: error journal unwritable ({e}): {line}");
                LogLocation::Fallback
            }
        }
    }

    /// Append one entry to the file of its timestamp's day.
    pub fn append(&self, entry: &JournalEntry) -> Result<PathBuf, JournalError> {
        let path = self.path_for(entry.timestamp.date_naive());
        let mut line = serde_json::to_vec(entry)?;
        line.push(b'\n');

        let _guard = self.write_lock.lock();
        fs::create_dir_all(&self.dir)?;
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)?;
        // Terminate a line torn by an earlier crash so this entry stays parseable
        let len = file.metadata()?.len();
        if len > 0 {
            let mut last = [0u8; 1];
            file.seek(SeekFrom::Start(len - 1))?;
            file.read_exact(&mut last)?;
            if last[0] != b'\n' {
                line.insert(0, b'\n');
            }
        }
        // Single write so each line lands whole
        file.write_all(&line)?;
        file.sync_data()?;
        Ok(path)
    }

    /// Entries with `start <= timestamp <= end`, oldest first.
    ///
    /// Unparseable lines (e.g. a torn final line after a crash) are skipped.
    pub fn read_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<JournalEntry>, JournalError> {
        let mut entries = Vec::new();
        if start > end {
            return Ok(entries);
        }

        let mut day = start.date_naive();
        let last = end.date_naive();
        while day <= last {
            let path = self.path_for(day);
            self.read_file(&path, &mut entries, start, end)?;
            match day.succ_opt() {
                Some(next) => day = next,
                None => break,
            }
        }

        entries.sort_by_key(|e| e.timestamp);
        Ok(entries)
    }

    fn read_file(
        &self,
        path: &Path,
        out: &mut Vec<JournalEntry>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<(), JournalError> {
        let file = match fs::File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        for (lineno, line) in BufReader::new(file).lines().enumerate() {
            let line = match line {
                Ok(l) => l,
                Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                    warn!(path = %path.display(), line = lineno + 1, "non-UTF-8 journal line, skipping");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<JournalEntry>(trimmed) {
                Ok(entry) if entry.timestamp >= start && entry.timestamp <= end => out.push(entry),
                Ok(_) => {}
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        line = lineno + 1,
                        error = %e,
                        "corrupt journal line, skipping"
                    );
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "journal_tests.rs"]
mod tests;
