// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Verdict document parsing shared by all judge backends.

use super::JudgeError;
use pj_core::{Confidence, ItemKey, ScoreRecord};
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
struct Verdict {
    scores: BTreeMap<String, Option<f64>>,
    #[serde(default)]
    evidence: String,
    #[serde(default)]
    confidence: Confidence,
    #[serde(default)]
    reverse_scored: bool,
}

/// Slice from the first `{` to the last `}`.
///
/// Judges often wrap the document in a code fence or a sentence of prose.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

/// Parse a judge's raw output into a score record for `key`.
pub fn parse_verdict(key: &ItemKey, raw: &str) -> Result<ScoreRecord, JudgeError> {
    let json = extract_json_object(raw)
        .ok_or_else(|| JudgeError::MalformedOutput("no JSON object in judge output".into()))?;
    let verdict: Verdict = serde_json::from_str(json)
        .map_err(|e| JudgeError::MalformedOutput(format!("invalid verdict: {e}")))?;
    if verdict.scores.is_empty() {
        return Err(JudgeError::MalformedOutput("verdict has no scores".into()));
    }

    let mut record = ScoreRecord::new(key.clone());
    record.scores = verdict
        .scores
        .into_iter()
        .map(|(dim, score)| (dim.trim().to_lowercase(), score))
        .collect();
    record.evidence = verdict.evidence;
    record.confidence = verdict.confidence;
    record.reverse_scored = verdict.reverse_scored;
    Ok(record)
}

#[cfg(test)]
#[path = "verdict_tests.rs"]
mod tests;
