// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::Serialize;

/// Live batch counters, published after every completed item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// Items in this run's input
    pub total: usize,
    /// Items skipped because a previous run already processed them
    pub skipped: usize,
    /// Items completed by this run, success or failure
    pub completed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub in_flight: usize,
}

impl Progress {
    /// Items still waiting for a worker or running.
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.skipped + self.completed)
    }
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
