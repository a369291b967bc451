// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pj batch engine: retry, aggregation, and orchestration

pub mod aggregate;
mod error;
mod orchestrator;
pub mod paths;
mod progress;
pub mod retry;
mod summary;

pub use aggregate::{AggregatorConfig, ConfidenceWeights, DimensionSummary, ScoreAggregator};
pub use error::{BatchError, ItemError};
pub use orchestrator::{BatchConfig, BatchDeps, Orchestrator};
pub use progress::Progress;
pub use retry::{execute_with_retry, RetryOutcome, RetryPolicy, Retryable};
pub use summary::BatchSummary;
