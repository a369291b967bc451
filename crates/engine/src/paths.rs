// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared path builders for a batch output directory.
//!
//! Used by both the orchestrator (writer) and the inspection commands
//! (reader) so every artifact lives at a consistent place:
//!   `<output>/checkpoint.json`
//!   `<output>/errors/errors-YYYY-MM-DD.jsonl`
//!   `<output>/aggregate.json`
//!   `<output>/pj.log`

use std::path::{Path, PathBuf};

/// Structure: `{output}/checkpoint.json`
pub fn checkpoint_path(output: &Path) -> PathBuf {
    output.join("checkpoint.json")
}

/// Directory holding the day-partitioned error journal.
///
/// Structure: `{output}/errors/`
pub fn journal_dir(output: &Path) -> PathBuf {
    output.join("errors")
}

/// Structure: `{output}/aggregate.json`
pub fn aggregate_path(output: &Path) -> PathBuf {
    output.join("aggregate.json")
}

/// Structure: `{output}/pj.log`
pub fn log_path(output: &Path) -> PathBuf {
    output.join("pj.log")
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
