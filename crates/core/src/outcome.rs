// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-item outcome of a batch run.

use crate::item::ItemStatus;
use crate::score::ScoreRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What happened to one work item.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    /// Judge produced a verdict and the aggregator accepted it
    Succeeded(ScoreRecord),
    /// Retries were exhausted; the next resumed run tries again
    FailedRetryable(String),
    /// The record can never be scored; skipped on resume
    FailedPermanent(String),
}

impl ItemOutcome {
    pub fn kind(&self) -> OutcomeKind {
        OutcomeKind::from(self)
    }

    /// Short human-readable detail persisted alongside the status.
    pub fn detail(&self) -> String {
        match self {
            ItemOutcome::Succeeded(record) => {
                let scored = record.present_scores().count();
                format!("{} dimension(s) scored, confidence {}", scored, record.confidence)
            }
            ItemOutcome::FailedRetryable(reason) | ItemOutcome::FailedPermanent(reason) => {
                reason.clone()
            }
        }
    }
}

/// Tag-only variant of [`ItemOutcome`] for checkpoints and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutcomeKind {
    Succeeded,
    FailedRetryable,
    FailedPermanent,
}

impl OutcomeKind {
    /// Whether a resumed run must skip the item.
    pub fn is_processed(self) -> bool {
        matches!(self, OutcomeKind::Succeeded | OutcomeKind::FailedPermanent)
    }

    pub fn item_status(self) -> ItemStatus {
        match self {
            OutcomeKind::Succeeded => ItemStatus::Succeeded,
            OutcomeKind::FailedRetryable | OutcomeKind::FailedPermanent => ItemStatus::Failed,
        }
    }
}

impl From<&ItemOutcome> for OutcomeKind {
    fn from(o: &ItemOutcome) -> Self {
        match o {
            ItemOutcome::Succeeded(_) => OutcomeKind::Succeeded,
            ItemOutcome::FailedRetryable(_) => OutcomeKind::FailedRetryable,
            ItemOutcome::FailedPermanent(_) => OutcomeKind::FailedPermanent,
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeKind::Succeeded => write!(f, "succeeded"),
            OutcomeKind::FailedRetryable => write!(f, "failed-retryable"),
            OutcomeKind::FailedPermanent => write!(f, "failed-permanent"),
        }
    }
}

#[cfg(test)]
#[path = "outcome_tests.rs"]
mod tests;
