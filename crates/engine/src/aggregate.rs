// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Score aggregation across scored items.
//!
//! Each accepted [`ScoreRecord`] contributes its non-null scores to the
//! running aggregate of the matching dimension. Reverse-scored records are
//! transformed first. Every contribution also carries a weight derived from
//! the verdict's confidence and whether it cited evidence.

use pj_core::{mirror, Confidence, DimensionAggregate, ReverseFn, ScaleBounds, ScoreRecord, BIG_FIVE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Weight of a contribution per confidence level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceWeights {
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            high: 1.0,
            medium: 0.7,
            low: 0.4,
        }
    }
}

impl ConfidenceWeights {
    pub fn weight(&self, confidence: Confidence) -> f64 {
        match confidence {
            Confidence::High => self.high,
            Confidence::Medium => self.medium,
            Confidence::Low => self.low,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Dimensions always reported, even with no contributions
    pub dimensions: Vec<String>,
    pub scale: ScaleBounds,
    pub reverse: ReverseFn,
    pub confidence_weights: ConfidenceWeights,
    /// Weight multiplier for verdicts with blank evidence
    pub missing_evidence_factor: f64,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            dimensions: BIG_FIVE.iter().map(|d| d.to_string()).collect(),
            scale: ScaleBounds::default(),
            reverse: mirror,
            confidence_weights: ConfidenceWeights::default(),
            missing_evidence_factor: 0.5,
        }
    }
}

/// Finalized statistics for one dimension
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionSummary {
    pub mean: f64,
    pub weighted_mean: f64,
    pub count: u64,
    pub min: f64,
    pub max: f64,
}

pub struct ScoreAggregator {
    config: AggregatorConfig,
    dimensions: BTreeMap<String, DimensionAggregate>,
}

impl ScoreAggregator {
    pub fn new(config: AggregatorConfig) -> Self {
        Self::from_snapshot(config, BTreeMap::new())
    }

    /// Resume from a checkpointed snapshot.
    pub fn from_snapshot(
        config: AggregatorConfig,
        mut snapshot: BTreeMap<String, DimensionAggregate>,
    ) -> Self {
        for dim in &config.dimensions {
            snapshot.entry(dim.clone()).or_default();
        }
        Self {
            config,
            dimensions: snapshot,
        }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Accumulate one record's scores.
    pub fn ingest(&mut self, record: &ScoreRecord) {
        let mut weight = self.config.confidence_weights.weight(record.confidence);
        if !record.has_evidence() {
            weight *= self.config.missing_evidence_factor;
        }
        for (dim, raw) in record.present_scores() {
            let value = if record.reverse_scored {
                (self.config.reverse)(raw, self.config.scale)
            } else {
                raw
            };
            self.dimensions
                .entry(dim.to_string())
                .or_default()
                .add(value, weight);
        }
    }

    /// Running aggregates, as persisted in checkpoints.
    pub fn snapshot(&self) -> BTreeMap<String, DimensionAggregate> {
        self.dimensions.clone()
    }

    /// Per-dimension statistics.
    ///
    /// Dimensions with no contributions report the scale midpoint.
    pub fn finalize(&self) -> BTreeMap<String, DimensionSummary> {
        let midpoint = self.config.scale.midpoint();
        self.dimensions
            .iter()
            .map(|(dim, agg)| {
                let mean = agg.mean().unwrap_or(midpoint);
                let summary = DimensionSummary {
                    mean,
                    weighted_mean: agg.weighted_mean().unwrap_or(mean),
                    count: agg.count,
                    min: agg.min.unwrap_or(midpoint),
                    max: agg.max.unwrap_or(midpoint),
                };
                (dim.clone(), summary)
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "aggregate_tests.rs"]
mod tests;
