// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::judge::{Judge, JudgeError, JudgeRequest};
use async_trait::async_trait;
use pj_core::ScoreRecord;
use tracing::Instrument;

/// Wrapper that adds tracing to any Judge
#[derive(Clone)]
pub struct TracedJudge<J> {
    inner: J,
}

impl<J> TracedJudge<J> {
    pub fn new(inner: J) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<J: Judge> Judge for TracedJudge<J> {
    async fn score(&self, request: &JudgeRequest) -> Result<ScoreRecord, JudgeError> {
        let span = tracing::info_span!("judge.score", key = %request.key);
        async {
            tracing::debug!(text_len = request.text.len(), "scoring");
            let start = std::time::Instant::now();
            let result = self.inner.score(request).await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Ok(record) => tracing::info!(
                    elapsed_ms,
                    scored = record.present_scores().count(),
                    confidence = %record.confidence,
                    "scored"
                ),
                Err(e) if e.is_permanent() => {
                    tracing::error!(elapsed_ms, reason = e.reason(), error = %e, "judge rejected record")
                }
                Err(e) => tracing::warn!(elapsed_ms, reason = e.reason(), error = %e, "judge call failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
