// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cooperative cancellation

use super::*;

fn cancel_after(orchestrator: &Orchestrator<FakeJudge>, after: Duration) {
    let token = orchestrator.cancel_token();
    tokio::spawn(async move {
        tokio::time::sleep(after).await;
        token.cancel();
    });
}

#[tokio::test(start_paused = true)]
async fn cancel_during_backoff_stops_without_checkpoint() {
    let judge = FakeJudge::new();
    judge.fail_always("item-1", unreachable());
    let ctx = setup(judge, config(1, 10));
    cancel_after(&ctx.orchestrator, Duration::from_secs(10));

    let summary = ctx.orchestrator.run(items(3), false).await.unwrap();

    assert!(summary.interrupted);
    assert_eq!(summary.checkpoint_writes, 0);
    assert_eq!(summary.succeeded + summary.failed(), 0);
    assert_eq!(summary.journal_entries, 1);
    assert_eq!(ctx.judge.calls().len(), 1);
    assert!(!crate::paths::checkpoint_path(&ctx.output()).exists());

    let ctx = ctx.restart(FakeJudge::new(), config(1, 10));
    let resumed = ctx.orchestrator.run(items(3), true).await.unwrap();
    assert!(!resumed.interrupted);
    assert_eq!(resumed.skipped, 0);
    assert_eq!(resumed.succeeded, 3);
}

#[tokio::test(start_paused = true)]
async fn cancel_keeps_earlier_checkpoints() {
    let judge = FakeJudge::new();
    judge.fail_always("item-3", unreachable());
    let ctx = setup(judge, config(1, 1));
    cancel_after(&ctx.orchestrator, Duration::from_secs(10));

    let summary = ctx.orchestrator.run(items(5), false).await.unwrap();
    assert!(summary.interrupted);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.checkpoint_writes, 2);
    assert_eq!(ctx.judge.call_count("item-4"), 0);

    let checkpoint = ctx.checkpoint();
    assert_eq!(checkpoint.processed_keys.len(), 2);
    assert_eq!(checkpoint.cursor_index, 2);

    let ctx = ctx.restart(FakeJudge::new(), config(1, 1));
    let resumed = ctx.orchestrator.run(items(5), true).await.unwrap();
    assert_eq!(resumed.skipped, 2);
    assert_eq!(resumed.succeeded, 3);
    assert_eq!(ctx.judge.call_count("item-1"), 0);
    assert_eq!(ctx.judge.call_count("item-3"), 1);
}

#[tokio::test(start_paused = true)]
async fn cancelled_before_start_dispatches_nothing() {
    let ctx = setup(FakeJudge::new(), config(2, 10));
    ctx.orchestrator.cancel_token().cancel();

    let summary = ctx.orchestrator.run(items(4), false).await.unwrap();

    assert!(summary.interrupted);
    assert_eq!(summary.total, 4);
    assert!(ctx.judge.calls().is_empty());
    assert_eq!(ctx.orchestrator.subscribe().borrow().remaining(), 4);
}
