// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::{Confidence, ScoreRecord};

/// Score record with the given non-null scores, medium confidence and evidence.
pub fn score_record(key: &str, scores: &[(&str, f64)]) -> ScoreRecord {
    let mut record = ScoreRecord::new(key);
    for (dim, score) in scores {
        record.scores.insert((*dim).to_string(), Some(*score));
    }
    record.evidence = format!("evidence for {key}");
    record
}

/// Same as [`score_record`], flagged as reverse-scored.
pub fn reversed_record(key: &str, scores: &[(&str, f64)]) -> ScoreRecord {
    let mut record = score_record(key, scores);
    record.reverse_scored = true;
    record
}

/// Same as [`score_record`] with an explicit confidence level.
pub fn record_with_confidence(
    key: &str,
    scores: &[(&str, f64)],
    confidence: Confidence,
) -> ScoreRecord {
    let mut record = score_record(key, scores);
    record.confidence = confidence;
    record
}
