// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for external I/O

pub mod encoding;
pub mod judge;
pub mod subprocess;
pub mod traced;

pub use encoding::{Decoded, EncodingError, EncodingGateway};
pub use judge::{
    extract_json_object, parse_verdict, CommandJudge, HttpJudge, HttpJudgeConfig, Judge,
    JudgeError, JudgeRequest, DEFAULT_PROMPT,
};
pub use traced::TracedJudge;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use judge::{FakeJudge, JudgeCall};
