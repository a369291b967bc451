// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Checkpoint store failures abort the run

use super::*;
use std::sync::atomic::AtomicBool;

/// Writer whose temp-file write fails once `broken` is set
#[derive(Clone, Default)]
struct BreakableWriter {
    broken: Arc<AtomicBool>,
}

impl CheckpointWriter for BreakableWriter {
    fn write_tmp(&self, path: &Path, data: &[u8]) -> Result<(), CheckpointError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(std::io::Error::other("no space left on device").into());
        }
        FsCheckpointWriter.write_tmp(path, data)
    }

    fn fsync_file(&self, path: &Path) -> Result<(), CheckpointError> {
        FsCheckpointWriter.fsync_file(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), CheckpointError> {
        FsCheckpointWriter.rename(from, to)
    }

    fn fsync_dir(&self, path: &Path) -> Result<(), CheckpointError> {
        FsCheckpointWriter.fsync_dir(path)
    }
}

fn orchestrator_with(
    dir: &Path,
    writer: BreakableWriter,
    judge: FakeJudge,
) -> Orchestrator<FakeJudge, BreakableWriter> {
    Orchestrator::new(
        BatchDeps {
            judge,
            gateway: EncodingGateway::default(),
            store: CheckpointStore::with_writer(writer, crate::paths::checkpoint_path(dir)),
            journal: ErrorJournal::new(crate::paths::journal_dir(dir)),
        },
        config(1, 2),
    )
    .unwrap()
}

#[tokio::test(start_paused = true)]
async fn failed_write_aborts_and_is_journaled() {
    let dir = tempfile::tempdir().unwrap();
    let writer = BreakableWriter::default();
    writer.broken.store(true, Ordering::SeqCst);
    let judge = FakeJudge::new();
    let orchestrator = orchestrator_with(dir.path(), writer, judge.clone());

    let err = orchestrator.run(items(5), false).await.unwrap_err();

    assert!(matches!(err, BatchError::Checkpoint(_)), "{err}");
    // Dispatch stops at the failed write
    assert!(judge.calls().len() < 5);

    let entries = journal_entries(dir.path());
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].error_kind, "checkpoint_io");
    assert_eq!(entries[0].context["op"], "save");
    assert!(entries[0].message.contains("no space left on device"));
}

#[tokio::test(start_paused = true)]
async fn previous_checkpoint_survives_failed_write() {
    let dir = tempfile::tempdir().unwrap();
    let writer = BreakableWriter::default();
    let orchestrator = orchestrator_with(dir.path(), writer.clone(), FakeJudge::new());
    orchestrator
        .run(items(4).into_iter().take(2).collect(), false)
        .await
        .unwrap();

    writer.broken.store(true, Ordering::SeqCst);
    let err = orchestrator.run(items(4), true).await.unwrap_err();
    assert!(matches!(err, BatchError::Checkpoint(_)));

    let survivor = CheckpointStore::new(crate::paths::checkpoint_path(dir.path()))
        .load()
        .unwrap()
        .unwrap();
    assert_eq!(survivor.processed_keys.len(), 2);
    assert!(!dir.path().join("checkpoint.json.tmp").exists());
}

#[tokio::test(start_paused = true)]
async fn unreadable_checkpoint_aborts_resume() {
    let ctx = setup(FakeJudge::new(), config(1, 2));
    std::fs::create_dir_all(crate::paths::checkpoint_path(&ctx.output())).unwrap();

    let err = ctx.orchestrator.run(items(2), true).await.unwrap_err();

    assert!(matches!(err, BatchError::Checkpoint(_)));
    assert!(ctx.judge.calls().is_empty());
    let entries = ctx.journal();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].context["op"], "load");
}
