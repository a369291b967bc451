// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake judge for deterministic testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{Judge, JudgeError, JudgeRequest};
use async_trait::async_trait;
use parking_lot::Mutex;
use pj_core::{ItemKey, ScoreRecord, BIG_FIVE};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

/// Recorded call to FakeJudge
#[derive(Debug, Clone, PartialEq)]
pub struct JudgeCall {
    pub key: ItemKey,
    pub text: String,
}

/// Fake judge for testing
///
/// Responses are scripted per key and consumed in order; once a key's
/// script is exhausted it gets the default verdict. Every call is recorded.
#[derive(Clone)]
pub struct FakeJudge {
    inner: Arc<Mutex<FakeJudgeState>>,
}

struct FakeJudgeState {
    default_scores: Vec<(String, f64)>,
    scripts: HashMap<ItemKey, VecDeque<Result<ScoreRecord, JudgeError>>>,
    always: HashMap<ItemKey, JudgeError>,
    latency: Duration,
    calls: Vec<JudgeCall>,
    in_flight: usize,
    max_in_flight: usize,
}

impl Default for FakeJudge {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeJudge {
    /// Create a fake that scores every Big-Five dimension at 3
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeJudgeState {
                default_scores: BIG_FIVE.iter().map(|d| (d.to_string(), 3.0)).collect(),
                scripts: HashMap::new(),
                always: HashMap::new(),
                latency: Duration::ZERO,
                calls: Vec::new(),
                in_flight: 0,
                max_in_flight: 0,
            })),
        }
    }

    /// Replace the scores of the default verdict
    pub fn with_default_scores(self, scores: &[(&str, f64)]) -> Self {
        self.inner.lock().default_scores =
            scores.iter().map(|(d, s)| (d.to_string(), *s)).collect();
        self
    }

    /// Delay every call, to observe concurrency
    pub fn with_latency(self, latency: Duration) -> Self {
        self.inner.lock().latency = latency;
        self
    }

    /// Queue a verdict for `key`
    pub fn respond(&self, key: &str, record: ScoreRecord) {
        self.push(key, Ok(record));
    }

    /// Queue one failure for `key`
    pub fn fail(&self, key: &str, error: JudgeError) {
        self.push(key, Err(error));
    }

    /// Queue `times` identical failures for `key`
    pub fn fail_times(&self, key: &str, times: usize, error: JudgeError) {
        for _ in 0..times {
            self.push(key, Err(error.clone()));
        }
    }

    /// Fail every call for `key`
    pub fn fail_always(&self, key: &str, error: JudgeError) {
        self.inner.lock().always.insert(ItemKey::new(key), error);
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<JudgeCall> {
        self.inner.lock().calls.clone()
    }

    /// Number of calls made for `key`
    pub fn call_count(&self, key: &str) -> usize {
        self.inner.lock().calls.iter().filter(|c| c.key == key).count()
    }

    /// Highest number of calls observed running at once
    pub fn max_in_flight(&self) -> usize {
        self.inner.lock().max_in_flight
    }

    fn push(&self, key: &str, response: Result<ScoreRecord, JudgeError>) {
        self.inner
            .lock()
            .scripts
            .entry(ItemKey::new(key))
            .or_default()
            .push_back(response);
    }
}

/// Decrements the in-flight count even when the call is cancelled
struct InFlight(Arc<Mutex<FakeJudgeState>>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.lock().in_flight -= 1;
    }
}

#[async_trait]
impl Judge for FakeJudge {
    async fn score(&self, request: &JudgeRequest) -> Result<ScoreRecord, JudgeError> {
        let latency = {
            let mut inner = self.inner.lock();
            inner.calls.push(JudgeCall {
                key: request.key.clone(),
                text: request.text.clone(),
            });
            inner.in_flight += 1;
            inner.max_in_flight = inner.max_in_flight.max(inner.in_flight);
            inner.latency
        };
        let guard = InFlight(Arc::clone(&self.inner));
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        drop(guard);

        let mut inner = self.inner.lock();
        if let Some(error) = inner.always.get(&request.key) {
            return Err(error.clone());
        }
        if let Some(next) = inner
            .scripts
            .get_mut(&request.key)
            .and_then(VecDeque::pop_front)
        {
            return next.map(|mut record| {
                record.key = request.key.clone();
                record
            });
        }

        let mut record = ScoreRecord::new(request.key.clone());
        for (dim, score) in &inner.default_scores {
            record.scores.insert(dim.clone(), Some(*score));
        }
        record.evidence = format!("fake verdict for {}", request.key);
        Ok(record)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
