// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resume from an existing checkpoint

use super::*;
use yare::parameterized;

#[tokio::test(start_paused = true)]
async fn rerun_after_completion_processes_nothing() {
    let ctx = setup(FakeJudge::new(), config(3, 4));
    let first = ctx.orchestrator.run(items(10), false).await.unwrap();
    let before = ctx.checkpoint();

    let ctx = ctx.restart(FakeJudge::new(), config(3, 4));
    let second = ctx.orchestrator.run(items(10), true).await.unwrap();

    assert_eq!(second.skipped, 10);
    assert_eq!(second.succeeded + second.failed(), 0);
    assert_eq!(second.checkpoint_writes, 0);
    assert!(ctx.judge.calls().is_empty());
    assert_eq!(second.aggregate, first.aggregate);
    assert_eq!(second.run_id, first.run_id);
    assert_eq!(ctx.checkpoint(), before);
}

#[parameterized(
    none = { 0 },
    one = { 1 },
    below_interval = { 3 },
    at_interval = { 4 },
    most = { 9 },
    all = { 10 },
)]
#[test_macro(tokio::test(start_paused = true))]
async fn resume_after_n_items_scores_each_remaining_item_once(n: usize) {
    let ctx = setup(FakeJudge::new(), config(2, 4));
    ctx.orchestrator
        .run(items(10).into_iter().take(n).collect(), false)
        .await
        .unwrap();

    let ctx = ctx.restart(FakeJudge::new(), config(2, 4));
    let summary = ctx.orchestrator.run(items(10), true).await.unwrap();

    assert_eq!(summary.skipped, n);
    assert_eq!(summary.succeeded, 10 - n);
    for i in 1..=10 {
        let expected = usize::from(i > n);
        assert_eq!(ctx.judge.call_count(&format!("item-{i}")), expected, "item-{i}");
    }

    let checkpoint = ctx.checkpoint();
    assert_eq!(checkpoint.processed_keys.len(), 10);
    assert_eq!(checkpoint.cursor_index, 10);
    assert_eq!(checkpoint.aggregate_snapshot["openness"].count, 10);
}

#[tokio::test(start_paused = true)]
async fn resumed_aggregate_matches_uninterrupted_run() {
    let scored = |judge: &FakeJudge| {
        for i in 1..=6 {
            let record = pj_core::test_support::score_record(
                "ignored",
                &[("openness", (i % 5 + 1) as f64)],
            );
            judge.respond(&format!("item-{i}"), record);
        }
    };

    let straight_judge = FakeJudge::new();
    scored(&straight_judge);
    let straight = setup(straight_judge, config(1, 2));
    let expected = straight.orchestrator.run(items(6), false).await.unwrap();

    let first_judge = FakeJudge::new();
    scored(&first_judge);
    let ctx = setup(first_judge, config(1, 2));
    ctx.orchestrator
        .run(items(6).into_iter().take(3).collect(), false)
        .await
        .unwrap();
    let second_judge = FakeJudge::new();
    scored(&second_judge);
    let ctx = ctx.restart(second_judge, config(1, 2));
    let resumed = ctx.orchestrator.run(items(6), true).await.unwrap();

    assert_eq!(resumed.aggregate, expected.aggregate);
}

#[tokio::test(start_paused = true)]
async fn retryable_failures_are_attempted_again() {
    let judge = FakeJudge::new();
    judge.fail_always("item-3", unreachable());
    let mut cfg = config(2, 10);
    cfg.retry = RetryPolicy::new(0, vec![]);
    let ctx = setup(judge, cfg);
    let first = ctx.orchestrator.run(items(5), false).await.unwrap();
    assert_eq!(first.failed_retryable, 1);

    let ctx = ctx.restart(FakeJudge::new(), config(2, 10));
    let second = ctx.orchestrator.run(items(5), true).await.unwrap();

    assert_eq!(second.skipped, 4);
    assert_eq!(second.succeeded, 1);
    assert_eq!(ctx.judge.calls().len(), 1);
    assert_eq!(ctx.judge.call_count("item-3"), 1);

    let checkpoint = ctx.checkpoint();
    assert!(checkpoint.is_processed("item-3"));
    assert_eq!(checkpoint.results_so_far.len(), 5);
    assert_eq!(checkpoint.results_so_far[2].status, OutcomeKind::Succeeded);
}

#[tokio::test(start_paused = true)]
async fn permanent_failures_stay_skipped() {
    let judge = FakeJudge::new();
    judge.fail_always("item-2", JudgeError::InvalidInput("blank".into()));
    let ctx = setup(judge, config(2, 10));
    ctx.orchestrator.run(items(3), false).await.unwrap();

    let ctx = ctx.restart(FakeJudge::new(), config(2, 10));
    let summary = ctx.orchestrator.run(items(3), true).await.unwrap();

    assert_eq!(summary.skipped, 3);
    assert_eq!(ctx.judge.call_count("item-2"), 0);
    assert_eq!(
        ctx.checkpoint().results_so_far[1].status,
        OutcomeKind::FailedPermanent
    );
}

#[tokio::test(start_paused = true)]
async fn no_resume_starts_over() {
    let ctx = setup(FakeJudge::new(), config(2, 10));
    let first = ctx.orchestrator.run(items(4), false).await.unwrap();

    let ctx = ctx.restart(FakeJudge::new(), config(2, 10));
    let second = ctx.orchestrator.run(items(4), false).await.unwrap();

    assert_eq!(second.skipped, 0);
    assert_eq!(second.succeeded, 4);
    assert_ne!(second.run_id, first.run_id);
    assert_eq!(ctx.checkpoint().aggregate_snapshot["openness"].count, 4);
}

#[tokio::test(start_paused = true)]
async fn corrupt_checkpoint_starts_fresh() {
    let ctx = setup(FakeJudge::new(), config(2, 10));
    std::fs::write(crate::paths::checkpoint_path(&ctx.output()), "{ torn").unwrap();

    let summary = ctx.orchestrator.run(items(2), true).await.unwrap();
    assert_eq!(summary.succeeded, 2);
    assert!(ctx.output().join("checkpoint.bak").exists());
}
