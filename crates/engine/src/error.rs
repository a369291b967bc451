// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the batch engine

use crate::retry::Retryable;
use pj_adapters::{EncodingError, JudgeError};
use pj_core::TransitionError;
use pj_storage::CheckpointError;
use thiserror::Error;

/// Errors that abort a whole batch run
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("invalid batch configuration: {0}")]
    InvalidConfig(String),
    #[error("checkpoint store failed, run aborted")]
    Checkpoint(#[from] CheckpointError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("worker task failed: {0}")]
    Worker(String),
}

/// Why one item could not be scored
#[derive(Debug, Error)]
pub enum ItemError {
    #[error(transparent)]
    Judge(#[from] JudgeError),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error("record is empty")]
    EmptyRecord,
    #[error("scoring crashed: {0}")]
    Panicked(String),
}

impl ItemError {
    /// Category recorded as the journal entry's `error_kind`.
    pub fn journal_kind(&self) -> &'static str {
        match self {
            ItemError::Judge(e) if e.is_permanent() => "malformed_input",
            ItemError::Judge(_) => "transient_judge",
            ItemError::Encoding(_) => "encoding",
            ItemError::EmptyRecord => "malformed_input",
            ItemError::Panicked(_) => "worker_panic",
        }
    }
}

impl Retryable for ItemError {
    fn is_permanent(&self) -> bool {
        match self {
            ItemError::Judge(e) => e.is_permanent(),
            ItemError::Encoding(_) | ItemError::EmptyRecord | ItemError::Panicked(_) => true,
        }
    }
}
