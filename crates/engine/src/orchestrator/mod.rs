// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Batch orchestrator
//!
//! Drives a set of work items through the judge with bounded concurrency.
//!
//! ```text
//! dispatch (≤ worker_limit tasks)
//!   │
//!   worker: read record → retry(judge) → journal failures
//!   │
//! completion loop (single owner of all batch state)
//!   ├── ingest into ScoreAggregator
//!   ├── update processed_keys / results
//!   └── every checkpoint_interval completions → CheckpointStore::save
//! ```
//!
//! Only the completion loop mutates the aggregate, the processed set, and
//! the results list. A checkpoint failure aborts the run; any single item
//! failure does not.

mod worker;

use crate::aggregate::{AggregatorConfig, ScoreAggregator};
use crate::error::{BatchError, ItemError};
use crate::progress::Progress;
use crate::retry::RetryPolicy;
use crate::summary::BatchSummary;
use chrono::Utc;
use indexmap::IndexMap;
use pj_adapters::{EncodingGateway, Judge};
use pj_core::{ItemKey, ItemOutcome, ItemStatus, OutcomeKind, RunId, WorkItem};
use pj_storage::{
    Checkpoint, CheckpointError, CheckpointStore, CheckpointWriter, ErrorJournal,
    FsCheckpointWriter, ItemResult, CHECKPOINT_VERSION,
};
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use worker::{Completion, WorkerContext};

/// Tuning for a batch run
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub worker_limit: usize,
    /// Completions between checkpoint writes
    pub checkpoint_interval: usize,
    /// Bound on each judge attempt
    pub item_timeout: Duration,
    pub retry: RetryPolicy,
    pub aggregate: AggregatorConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            worker_limit: 4,
            checkpoint_interval: 10,
            item_timeout: Duration::from_secs(300),
            retry: RetryPolicy::default(),
            aggregate: AggregatorConfig::default(),
        }
    }
}

impl BatchConfig {
    pub fn validate(&self) -> Result<(), BatchError> {
        if self.worker_limit == 0 {
            return Err(BatchError::InvalidConfig(
                "worker_limit must be at least 1".into(),
            ));
        }
        if self.checkpoint_interval == 0 {
            return Err(BatchError::InvalidConfig(
                "checkpoint_interval must be at least 1".into(),
            ));
        }
        if self.item_timeout.is_zero() {
            return Err(BatchError::InvalidConfig(
                "item_timeout must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Collaborators the orchestrator drives
pub struct BatchDeps<J, W: CheckpointWriter = FsCheckpointWriter> {
    pub judge: J,
    pub gateway: EncodingGateway,
    pub store: CheckpointStore<W>,
    pub journal: ErrorJournal,
}

pub struct Orchestrator<J, W: CheckpointWriter = FsCheckpointWriter> {
    ctx: Arc<WorkerContext<J>>,
    store: Arc<CheckpointStore<W>>,
    config: BatchConfig,
    cancel: CancellationToken,
    progress: watch::Sender<Progress>,
}

impl<J: Judge, W: CheckpointWriter> Orchestrator<J, W> {
    pub fn new(deps: BatchDeps<J, W>, config: BatchConfig) -> Result<Self, BatchError> {
        config.validate()?;
        let cancel = CancellationToken::new();
        let ctx = WorkerContext {
            judge: deps.judge,
            gateway: deps.gateway,
            journal: deps.journal,
            retry: config.retry.clone(),
            item_timeout: config.item_timeout,
            scale: config.aggregate.scale,
            cancel: cancel.clone(),
            journaled: AtomicUsize::new(0),
        };
        let (progress, _) = watch::channel(Progress::default());
        Ok(Self {
            ctx: Arc::new(ctx),
            store: Arc::new(deps.store),
            config,
            cancel,
            progress,
        })
    }

    /// Token that stops dispatch and cuts retry backoff short when cancelled.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Progress> {
        self.progress.subscribe()
    }

    pub fn journal_dir(&self) -> &Path {
        self.ctx.journal.dir()
    }

    pub fn checkpoint_path(&self) -> &Path {
        self.store.path()
    }

    /// Score every item not already processed and return the run summary.
    ///
    /// With `resume`, items recorded as processed in the existing checkpoint
    /// are skipped and its aggregate is carried forward. Without it, any
    /// existing checkpoint is replaced on the first write.
    pub async fn run(&self, items: Vec<WorkItem>, resume: bool) -> Result<BatchSummary, BatchError> {
        let started = Instant::now();
        let journaled_before = self.ctx.journaled.load(Ordering::Relaxed);
        let prior = if resume {
            self.load_checkpoint().await?
        } else {
            None
        };
        let mut state = RunState::new(items, prior, self.config.aggregate.clone())?;

        let mut progress = Progress {
            total: state.items.len(),
            skipped: state.skipped,
            ..Progress::default()
        };
        self.progress.send_replace(progress);
        tracing::info!(
            run_id = %state.run_id,
            total = progress.total,
            skipped = progress.skipped,
            resume,
            workers = self.config.worker_limit,
            "batch starting"
        );

        let mut queue = state.pending.clone().into_iter();
        let mut workers = JoinSet::new();
        let mut dispatched = HashMap::new();
        let mut since_checkpoint = 0;
        loop {
            while workers.len() < self.config.worker_limit && !self.cancel.is_cancelled() {
                let Some(index) = queue.next() else { break };
                let item = &mut state.items[index];
                item.transition(ItemStatus::InProgress)?;
                let ctx = Arc::clone(&self.ctx);
                let handle = workers.spawn(ctx.process(index, item.key.clone(), item.source.clone()));
                dispatched.insert(handle.id(), (index, item.key.clone()));
            }
            progress.in_flight = workers.len();
            self.progress.send_replace(progress);

            let Some(joined) = workers.join_next_with_id().await else {
                break;
            };
            let completion = match joined {
                Ok((id, completion)) => {
                    dispatched.remove(&id);
                    completion
                }
                Err(e) => match dispatched.remove(&e.id()) {
                    Some((index, key)) => self.worker_crashed(index, key, e),
                    None => return Err(BatchError::Worker(e.to_string())),
                },
            };
            let Some(outcome) = completion.outcome else {
                tracing::info!(key = %completion.key, "item interrupted, left for resume");
                continue;
            };

            let kind = state.record(completion.index, outcome)?;
            progress.completed += 1;
            match kind {
                OutcomeKind::Succeeded => progress.succeeded += 1,
                OutcomeKind::FailedRetryable | OutcomeKind::FailedPermanent => progress.failed += 1,
            }
            progress.in_flight = workers.len();
            self.progress.send_replace(progress);
            tracing::info!(key = %completion.key, status = %kind, "item settled");

            since_checkpoint += 1;
            if since_checkpoint >= self.config.checkpoint_interval && !self.cancel.is_cancelled() {
                self.write_checkpoint(&mut state).await?;
                since_checkpoint = 0;
            }
        }

        let interrupted = self.cancel.is_cancelled();
        if interrupted {
            tracing::warn!(
                completed = progress.completed,
                remaining = progress.remaining(),
                "batch interrupted, skipping final checkpoint"
            );
        } else if since_checkpoint > 0 {
            self.write_checkpoint(&mut state).await?;
        }

        let summary = BatchSummary {
            run_id: state.run_id.clone(),
            total: state.items.len(),
            succeeded: state.succeeded,
            failed_retryable: state.failed_retryable,
            failed_permanent: state.failed_permanent,
            skipped: state.skipped,
            checkpoint_writes: state.checkpoint_writes,
            journal_entries: self.ctx.journaled.load(Ordering::Relaxed) - journaled_before,
            interrupted,
            elapsed_ms: started.elapsed().as_millis() as u64,
            checkpoint_path: self.store.path().to_path_buf(),
            journal_dir: self.ctx.journal.dir().to_path_buf(),
            aggregate: state.aggregator.finalize(),
        };
        tracing::info!(
            run_id = %summary.run_id,
            succeeded = summary.succeeded,
            failed = summary.failed(),
            skipped = summary.skipped,
            checkpoints = summary.checkpoint_writes,
            elapsed_ms = summary.elapsed_ms,
            "batch finished"
        );
        Ok(summary)
    }

    async fn load_checkpoint(&self) -> Result<Option<Checkpoint>, BatchError> {
        let store = Arc::clone(&self.store);
        let loaded = tokio::task::spawn_blocking(move || store.load())
            .await
            .map_err(|e| BatchError::Worker(e.to_string()))?;
        match loaded {
            Ok(Some(checkpoint)) => {
                tracing::info!(
                    run_id = %checkpoint.run_id,
                    processed = checkpoint.processed_keys.len(),
                    cursor = checkpoint.cursor_index,
                    "resuming from checkpoint"
                );
                Ok(Some(checkpoint))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(self.checkpoint_failed("load", e)),
        }
    }

    async fn write_checkpoint(&self, state: &mut RunState) -> Result<(), BatchError> {
        let checkpoint = state.checkpoint();
        let store = Arc::clone(&self.store);
        let saved = tokio::task::spawn_blocking(move || store.save(&checkpoint))
            .await
            .map_err(|e| BatchError::Worker(e.to_string()))?;
        match saved {
            Ok(written) => {
                state.checkpoint_writes += 1;
                tracing::info!(
                    path = %written.path.display(),
                    size_bytes = written.size_bytes,
                    processed = state.processed.len(),
                    "checkpoint saved"
                );
                Ok(())
            }
            Err(e) => Err(self.checkpoint_failed("save", e)),
        }
    }

    /// A worker task that panicked settles its item as a permanent failure.
    fn worker_crashed(&self, index: usize, key: ItemKey, error: JoinError) -> Completion {
        let error = ItemError::Panicked(panic_message(error));
        tracing::error!(%key, error = %error, "worker task crashed");
        self.ctx.journal_failure(&key, 1, &error);
        Completion {
            index,
            key,
            outcome: Some(ItemOutcome::FailedPermanent(error.to_string())),
        }
    }

    fn checkpoint_failed(&self, op: &str, error: CheckpointError) -> BatchError {
        tracing::error!(op, path = %self.store.path().display(), error = %error, "checkpoint store failed");
        let mut context = BTreeMap::new();
        context.insert("op".to_string(), json!(op));
        context.insert(
            "path".to_string(),
            json!(self.store.path().display().to_string()),
        );
        self.ctx.journal.log("checkpoint_io", &error, context);
        self.ctx.journaled.fetch_add(1, Ordering::Relaxed);
        BatchError::Checkpoint(error)
    }
}

fn panic_message(error: JoinError) -> String {
    if !error.is_panic() {
        return error.to_string();
    }
    let payload = error.into_panic();
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

/// Batch state owned by the completion loop
struct RunState {
    run_id: RunId,
    items: Vec<WorkItem>,
    /// Indices of items to dispatch, in submission order
    pending: Vec<usize>,
    processed: BTreeSet<ItemKey>,
    results: IndexMap<ItemKey, ItemResult>,
    aggregator: ScoreAggregator,
    skipped: usize,
    succeeded: usize,
    failed_retryable: usize,
    failed_permanent: usize,
    checkpoint_writes: usize,
}

impl RunState {
    fn new(
        items: Vec<WorkItem>,
        prior: Option<Checkpoint>,
        aggregate: AggregatorConfig,
    ) -> Result<Self, BatchError> {
        let (run_id, processed, results, aggregator) = match prior {
            Some(checkpoint) => (
                checkpoint.run_id,
                checkpoint.processed_keys,
                checkpoint
                    .results_so_far
                    .into_iter()
                    .map(|r| (r.key.clone(), r))
                    .collect(),
                ScoreAggregator::from_snapshot(aggregate, checkpoint.aggregate_snapshot),
            ),
            None => (
                RunId::generate(),
                BTreeSet::new(),
                IndexMap::new(),
                ScoreAggregator::new(aggregate),
            ),
        };

        let mut seen = HashSet::new();
        let items: Vec<WorkItem> = items
            .into_iter()
            .filter(|item| {
                let first = seen.insert(item.key.clone());
                if !first {
                    tracing::warn!(key = %item.key, "duplicate work item key, ignoring repeat");
                }
                first
            })
            .collect();

        let mut state = Self {
            run_id,
            items,
            pending: Vec::new(),
            processed,
            results,
            aggregator,
            skipped: 0,
            succeeded: 0,
            failed_retryable: 0,
            failed_permanent: 0,
            checkpoint_writes: 0,
        };
        for index in 0..state.items.len() {
            let key = state.items[index].key.clone();
            if !state.processed.contains(&key) {
                state.pending.push(index);
                continue;
            }
            let status = match state.results.get_mut(&key) {
                Some(result) => {
                    result.index = index;
                    result.status.item_status()
                }
                None => ItemStatus::Succeeded,
            };
            state.items[index].transition(status)?;
            state.skipped += 1;
        }
        Ok(state)
    }

    fn record(&mut self, index: usize, outcome: ItemOutcome) -> Result<OutcomeKind, BatchError> {
        let kind = outcome.kind();
        let item = &mut self.items[index];
        item.transition(kind.item_status())?;
        let key = item.key.clone();

        match &outcome {
            ItemOutcome::Succeeded(record) => {
                self.aggregator.ingest(record);
                self.succeeded += 1;
            }
            ItemOutcome::FailedRetryable(_) => self.failed_retryable += 1,
            ItemOutcome::FailedPermanent(_) => self.failed_permanent += 1,
        }
        if kind.is_processed() {
            self.processed.insert(key.clone());
        } else {
            self.processed.remove(&key);
        }
        self.results.insert(
            key.clone(),
            ItemResult {
                key,
                index,
                status: kind,
                detail: outcome.detail(),
            },
        );
        Ok(kind)
    }

    /// Lowest submission index whose item has not reached a terminal status.
    fn cursor(&self) -> usize {
        self.items
            .iter()
            .take_while(|item| item.status().is_terminal())
            .count()
    }

    fn checkpoint(&self) -> Checkpoint {
        let mut results: Vec<ItemResult> = self.results.values().cloned().collect();
        results.sort_by(|a, b| a.index.cmp(&b.index).then_with(|| a.key.cmp(&b.key)));
        Checkpoint {
            version: CHECKPOINT_VERSION,
            run_id: self.run_id.clone(),
            updated_at: Utc::now(),
            processed_keys: self.processed.clone(),
            cursor_index: self.cursor(),
            aggregate_snapshot: self.aggregator.snapshot(),
            results_so_far: results,
        }
    }
}

#[cfg(test)]
#[path = "../orchestrator_tests/mod.rs"]
mod tests;
