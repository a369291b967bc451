// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Judge clients
//!
//! A judge takes one record's text and returns a [`ScoreRecord`]. Backends
//! differ only in transport: [`HttpJudge`] talks to an OpenAI-compatible
//! chat endpoint, [`CommandJudge`] pipes the record through a local program.
//! Both parse the same verdict document (see [`parse_verdict`]).

mod command;
mod http;
mod verdict;

pub use command::CommandJudge;
pub use http::{HttpJudge, HttpJudgeConfig, DEFAULT_PROMPT};
pub use verdict::{extract_json_object, parse_verdict};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeJudge, JudgeCall};

use async_trait::async_trait;
use pj_core::{ItemKey, ScoreRecord};
use std::time::Duration;
use thiserror::Error;

/// Errors from a single judge call
#[derive(Debug, Clone, PartialEq, Error)]
pub enum JudgeError {
    #[error("judge timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("malformed judge output: {0}")]
    MalformedOutput(String),
    #[error("judge unreachable: {0}")]
    Unreachable(String),
    #[error("record rejected as unscorable: {0}")]
    InvalidInput(String),
}

impl JudgeError {
    /// Permanent errors are never retried.
    pub fn is_permanent(&self) -> bool {
        matches!(self, JudgeError::InvalidInput(_))
    }

    /// Short machine-readable reason, used in logs and the error journal.
    pub fn reason(&self) -> &'static str {
        match self {
            JudgeError::Timeout(_) => "timeout",
            JudgeError::MalformedOutput(_) => "malformed_output",
            JudgeError::Unreachable(_) => "unreachable",
            JudgeError::InvalidInput(_) => "invalid_input",
        }
    }
}

/// One scoring request
#[derive(Debug, Clone)]
pub struct JudgeRequest {
    pub key: ItemKey,
    pub text: String,
}

impl JudgeRequest {
    pub fn new(key: impl Into<ItemKey>, text: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            text: text.into(),
        }
    }
}

/// Adapter for judging a single record
#[async_trait]
pub trait Judge: Send + Sync + 'static {
    /// Score one record.
    ///
    /// Implementations must be safe to call concurrently for distinct keys.
    async fn score(&self, request: &JudgeRequest) -> Result<ScoreRecord, JudgeError>;
}

#[async_trait]
impl<J: Judge + ?Sized> Judge for std::sync::Arc<J> {
    async fn score(&self, request: &JudgeRequest) -> Result<ScoreRecord, JudgeError> {
        (**self).score(request).await
    }
}

#[async_trait]
impl<J: Judge + ?Sized> Judge for Box<J> {
    async fn score(&self, request: &JudgeRequest) -> Result<ScoreRecord, JudgeError> {
        (**self).score(request).await
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
