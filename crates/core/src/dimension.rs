// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Running per-dimension statistics.

use serde::{Deserialize, Serialize};

/// Incremental statistics for one dimension.
///
/// Values are added already transformed (reverse scoring applied). Nothing
/// is ever subtracted: `count` equals the number of records that carried a
/// non-null score for the dimension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DimensionAggregate {
    pub sum: f64,
    pub count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default)]
    pub weighted_sum: f64,
    #[serde(default)]
    pub weight: f64,
}

impl DimensionAggregate {
    pub fn add(&mut self, value: f64, weight: f64) {
        self.sum += value;
        self.count += 1;
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
        self.weighted_sum += value * weight;
        self.weight += weight;
    }

    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }

    pub fn weighted_mean(&self) -> Option<f64> {
        (self.weight > 0.0).then(|| self.weighted_sum / self.weight)
    }
}

#[cfg(test)]
#[path = "dimension_tests.rs"]
mod tests;
