// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-item processing, run inside worker tasks.
//!
//! Workers read the record, drive the judge through the retry loop, and
//! journal every failure. They never touch aggregate state; the outcome is
//! handed back to the completion loop.

use crate::error::ItemError;
use crate::retry::{execute_with_retry, RetryOutcome, RetryPolicy};
use pj_adapters::{EncodingError, EncodingGateway, Judge, JudgeError, JudgeRequest};
use pj_core::{ItemKey, ItemOutcome, RecordSource, ScaleBounds, ScoreRecord};
use pj_storage::ErrorJournal;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub(crate) struct WorkerContext<J> {
    pub judge: J,
    pub gateway: EncodingGateway,
    pub journal: ErrorJournal,
    pub retry: RetryPolicy,
    pub item_timeout: Duration,
    pub scale: ScaleBounds,
    pub cancel: CancellationToken,
    pub journaled: AtomicUsize,
}

/// What a worker hands back to the completion loop
pub(crate) struct Completion {
    pub index: usize,
    pub key: ItemKey,
    /// `None` when cancellation interrupted the retry loop
    pub outcome: Option<ItemOutcome>,
}

impl<J: Judge> WorkerContext<J> {
    pub(crate) async fn process(
        self: Arc<Self>,
        index: usize,
        key: ItemKey,
        source: RecordSource,
    ) -> Completion {
        let outcome = self.score_item(&key, source).await;
        Completion {
            index,
            key,
            outcome,
        }
    }

    async fn score_item(self: &Arc<Self>, key: &ItemKey, source: RecordSource) -> Option<ItemOutcome> {
        let text = match self.load(source).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(%key, error = %e, "record cannot be scored");
                self.journal_failure(key, 1, &e);
                return Some(ItemOutcome::FailedPermanent(e.to_string()));
            }
        };

        let request = JudgeRequest {
            key: key.clone(),
            text,
        };
        let outcome = execute_with_retry(
            &self.retry,
            &self.cancel,
            |_| self.attempt(&request),
            |attempt, e| self.journal_failure(key, attempt, e),
        )
        .await;

        match outcome {
            RetryOutcome::Succeeded { value, .. } => Some(ItemOutcome::Succeeded(value)),
            RetryOutcome::Exhausted { error, attempts } => Some(ItemOutcome::FailedRetryable(
                format!("{error} (gave up after {attempts} attempts)"),
            )),
            RetryOutcome::Permanent { error, .. } => {
                Some(ItemOutcome::FailedPermanent(error.to_string()))
            }
            RetryOutcome::Cancelled { .. } => None,
        }
    }

    /// Resolve the record text, reading files through the encoding gateway.
    async fn load(self: &Arc<Self>, source: RecordSource) -> Result<String, ItemError> {
        let text = match source {
            RecordSource::Inline(text) => text,
            RecordSource::File(path) => {
                let ctx = Arc::clone(self);
                let read_path = path.clone();
                tokio::task::spawn_blocking(move || ctx.gateway.read_text(&read_path))
                    .await
                    .map_err(|e| EncodingError::Io {
                        path,
                        source: std::io::Error::other(e),
                    })??
            }
        };
        if text.trim().is_empty() {
            return Err(ItemError::EmptyRecord);
        }
        Ok(text)
    }

    /// One judge call, bounded by the item timeout and checked against the scale.
    async fn attempt(&self, request: &JudgeRequest) -> Result<ScoreRecord, ItemError> {
        let record = tokio::time::timeout(self.item_timeout, self.judge.score(request))
            .await
            .map_err(|_| JudgeError::Timeout(self.item_timeout))??;
        if let Some((dim, score)) = record.out_of_range(self.scale) {
            return Err(JudgeError::MalformedOutput(format!(
                "{dim} score {score} outside scale [{}, {}]",
                self.scale.min, self.scale.max
            ))
            .into());
        }
        Ok(record)
    }

    pub(crate) fn journal_failure(&self, key: &ItemKey, attempt: u32, error: &ItemError) {
        let mut context = BTreeMap::new();
        context.insert("key".to_string(), json!(key.as_str()));
        context.insert("attempt".to_string(), json!(attempt));
        context.insert("max_attempts".to_string(), json!(self.retry.max_attempts()));
        if let ItemError::Judge(judge_error) = error {
            context.insert("reason".to_string(), json!(judge_error.reason()));
        }
        self.journal.log(error.journal_kind(), error, context);
        self.journaled.fetch_add(1, Ordering::Relaxed);
    }
}
