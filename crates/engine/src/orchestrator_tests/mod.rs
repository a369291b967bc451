// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orchestrator tests

mod cancel;
mod checkpoint_failures;
mod items;
mod resume;
mod scenario;

use super::*;
use pj_adapters::{FakeJudge, JudgeError};
use pj_storage::JournalEntry;
use std::path::PathBuf;
use tempfile::TempDir;

/// Test context holding the orchestrator, its fake judge, and output dir
struct TestContext {
    dir: TempDir,
    judge: FakeJudge,
    orchestrator: Orchestrator<FakeJudge>,
}

impl TestContext {
    fn output(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Fresh orchestrator over the same output directory, as after a restart
    fn restart(self, judge: FakeJudge, config: BatchConfig) -> TestContext {
        let orchestrator = orchestrator_in(self.dir.path(), judge.clone(), config);
        TestContext {
            dir: self.dir,
            judge,
            orchestrator,
        }
    }

    fn checkpoint(&self) -> Checkpoint {
        CheckpointStore::new(crate::paths::checkpoint_path(self.dir.path()))
            .load()
            .unwrap()
            .expect("checkpoint written")
    }

    fn journal(&self) -> Vec<JournalEntry> {
        journal_entries(self.dir.path())
    }
}

fn config(worker_limit: usize, checkpoint_interval: usize) -> BatchConfig {
    BatchConfig {
        worker_limit,
        checkpoint_interval,
        ..BatchConfig::default()
    }
}

fn orchestrator_in(dir: &Path, judge: FakeJudge, config: BatchConfig) -> Orchestrator<FakeJudge> {
    Orchestrator::new(
        BatchDeps {
            judge,
            gateway: EncodingGateway::default(),
            store: CheckpointStore::new(crate::paths::checkpoint_path(dir)),
            journal: ErrorJournal::new(crate::paths::journal_dir(dir)),
        },
        config,
    )
    .unwrap()
}

fn setup(judge: FakeJudge, config: BatchConfig) -> TestContext {
    let dir = tempfile::tempdir().unwrap();
    let orchestrator = orchestrator_in(dir.path(), judge.clone(), config);
    TestContext {
        dir,
        judge,
        orchestrator,
    }
}

/// `item-1` .. `item-n`, inline records
fn items(n: usize) -> Vec<WorkItem> {
    (1..=n)
        .map(|i| WorkItem::inline(format!("item-{i}"), format!("answers of agent {i}")))
        .collect()
}

fn journal_entries(dir: &Path) -> Vec<JournalEntry> {
    let now = Utc::now();
    ErrorJournal::new(crate::paths::journal_dir(dir))
        .read_range(now - chrono::Duration::days(1), now + chrono::Duration::days(1))
        .unwrap()
}

fn result_keys(checkpoint: &Checkpoint) -> Vec<String> {
    checkpoint
        .results_so_far
        .iter()
        .map(|r| r.key.to_string())
        .collect()
}

fn unreachable() -> JudgeError {
    JudgeError::Unreachable("connection refused".into())
}

#[test]
fn rejects_zero_workers() {
    let dir = tempfile::tempdir().unwrap();
    let result = Orchestrator::new(
        BatchDeps {
            judge: FakeJudge::new(),
            gateway: EncodingGateway::default(),
            store: CheckpointStore::new(dir.path().join("checkpoint.json")),
            journal: ErrorJournal::new(dir.path().join("errors")),
        },
        config(0, 4),
    );
    assert!(matches!(result, Err(BatchError::InvalidConfig(_))));
}

#[test]
fn rejects_zero_checkpoint_interval() {
    let err = config(2, 0).validate().unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid batch configuration: checkpoint_interval must be at least 1"
    );
}
