// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Judge verdicts and rubric scale handling.

use crate::item::ItemKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// The Big Five dimensions every run tracks, even when no record scores them.
pub const BIG_FIVE: [&str; 5] = [
    "openness",
    "conscientiousness",
    "extraversion",
    "agreeableness",
    "neuroticism",
];

/// How sure the judge was about a verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    #[default]
    Medium,
    Low,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::High => write!(f, "high"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::Low => write!(f, "low"),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ScaleError {
    #[error("scale bounds must be finite, got [{min}, {max}]")]
    NotFinite { min: f64, max: f64 },
    #[error("scale minimum {min} must be below maximum {max}")]
    Inverted { min: f64, max: f64 },
}

/// Inclusive bounds of a rubric's answer scale (e.g. 1-5 Likert).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleBounds {
    pub min: f64,
    pub max: f64,
}

impl ScaleBounds {
    pub const LIKERT_5: ScaleBounds = ScaleBounds { min: 1.0, max: 5.0 };

    pub fn new(min: f64, max: f64) -> Result<Self, ScaleError> {
        if !min.is_finite() || !max.is_finite() {
            return Err(ScaleError::NotFinite { min, max });
        }
        if min >= max {
            return Err(ScaleError::Inverted { min, max });
        }
        Ok(Self { min, max })
    }

    /// Neutral value reported for dimensions nobody scored.
    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }
}

impl Default for ScaleBounds {
    fn default() -> Self {
        Self::LIKERT_5
    }
}

/// Transform applied to reverse-scored answers before aggregation.
pub type ReverseFn = fn(f64, ScaleBounds) -> f64;

/// Mirror a raw score within the scale: `min + max - raw` (`6 - raw` on 1-5).
pub fn mirror(raw: f64, bounds: ScaleBounds) -> f64 {
    bounds.min + bounds.max - raw
}

/// One judged unit: per-dimension raw scores plus the judge's justification.
///
/// A `None` score means the judge could not rate that dimension; it is kept
/// so reports can show the gap, but it never contributes to aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub key: ItemKey,
    pub scores: BTreeMap<String, Option<f64>>,
    #[serde(default)]
    pub evidence: String,
    #[serde(default)]
    pub confidence: Confidence,
    #[serde(default)]
    pub reverse_scored: bool,
}

impl ScoreRecord {
    pub fn new(key: impl Into<ItemKey>) -> Self {
        Self {
            key: key.into(),
            scores: BTreeMap::new(),
            evidence: String::new(),
            confidence: Confidence::default(),
            reverse_scored: false,
        }
    }

    pub fn has_evidence(&self) -> bool {
        !self.evidence.trim().is_empty()
    }

    /// Non-null scores in dimension order.
    pub fn present_scores(&self) -> impl Iterator<Item = (&str, f64)> {
        self.scores
            .iter()
            .filter_map(|(dim, score)| score.map(|s| (dim.as_str(), s)))
    }

    /// First non-null score that falls outside `bounds`, if any.
    pub fn out_of_range(&self, bounds: ScaleBounds) -> Option<(&str, f64)> {
        self.present_scores().find(|(_, s)| !bounds.contains(*s))
    }
}

#[cfg(test)]
#[path = "score_tests.rs"]
mod tests;
