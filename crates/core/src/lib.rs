// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pj-core: shared data model for the pj scoring pipeline

pub mod dimension;
pub mod id;
pub mod item;
pub mod outcome;
pub mod score;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use dimension::DimensionAggregate;
pub use id::{RunId, ShortId};
pub use item::{ItemKey, ItemStatus, RecordSource, TransitionError, WorkItem};
pub use outcome::{ItemOutcome, OutcomeKind};
pub use score::{
    mirror, Confidence, ReverseFn, ScaleBounds, ScaleError, ScoreRecord, BIG_FIVE,
};
