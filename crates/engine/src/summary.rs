// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::aggregate::DimensionSummary;
use pj_core::RunId;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Result of one orchestrator run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub run_id: RunId,
    /// Items in this run's input
    pub total: usize,
    pub succeeded: usize,
    pub failed_retryable: usize,
    pub failed_permanent: usize,
    /// Items already processed by an earlier run
    pub skipped: usize,
    pub checkpoint_writes: usize,
    /// Failures appended to the error journal during this run
    pub journal_entries: usize,
    pub interrupted: bool,
    pub elapsed_ms: u64,
    pub checkpoint_path: PathBuf,
    pub journal_dir: PathBuf,
    pub aggregate: BTreeMap<String, DimensionSummary>,
}

impl BatchSummary {
    pub fn failed(&self) -> usize {
        self.failed_retryable + self.failed_permanent
    }

    /// Items this run did not settle (only non-zero when interrupted).
    pub fn unsettled(&self) -> usize {
        self.total
            .saturating_sub(self.skipped + self.succeeded + self.failed())
    }
}
