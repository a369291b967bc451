// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end batch behavior with mixed item outcomes

use super::*;

/// Ten items, three workers, checkpoint every four completions. Item 5 is
/// unscorable; item 7 fails twice before succeeding.
fn mixed_batch() -> TestContext {
    let judge = FakeJudge::new();
    judge.fail_always("item-5", JudgeError::InvalidInput("not a questionnaire".into()));
    judge.fail_times("item-7", 2, unreachable());
    setup(judge, config(3, 4))
}

#[tokio::test(start_paused = true)]
async fn mixed_outcomes_summary() {
    let ctx = mixed_batch();
    let summary = ctx.orchestrator.run(items(10), false).await.unwrap();

    assert_eq!(summary.total, 10);
    assert_eq!(summary.succeeded, 9);
    assert_eq!(summary.failed_permanent, 1);
    assert_eq!(summary.failed_retryable, 0);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.checkpoint_writes, 3);
    assert_eq!(summary.journal_entries, 3);
    assert!(!summary.interrupted);
    assert_eq!(summary.unsettled(), 0);
}

#[tokio::test(start_paused = true)]
async fn permanent_failure_is_tried_once_transient_until_success() {
    let ctx = mixed_batch();
    ctx.orchestrator.run(items(10), false).await.unwrap();

    assert_eq!(ctx.judge.call_count("item-5"), 1);
    assert_eq!(ctx.judge.call_count("item-7"), 3);
    assert_eq!(ctx.judge.calls().len(), 12);
}

#[tokio::test(start_paused = true)]
async fn journal_holds_one_permanent_and_two_transient_entries() {
    let ctx = mixed_batch();
    ctx.orchestrator.run(items(10), false).await.unwrap();

    let journal = ctx.journal();
    assert_eq!(journal.len(), 3);
    let permanent: Vec<_> = journal
        .iter()
        .filter(|e| e.error_kind == "malformed_input")
        .collect();
    let transient: Vec<_> = journal
        .iter()
        .filter(|e| e.error_kind == "transient_judge")
        .collect();
    assert_eq!(permanent.len(), 1);
    assert_eq!(permanent[0].context["key"], "item-5");
    assert_eq!(transient.len(), 2);
    assert!(transient.iter().all(|e| e.context["key"] == "item-7"));
    assert_eq!(transient[0].context["reason"], "unreachable");
    let attempts: Vec<_> = transient.iter().map(|e| e.context["attempt"].clone()).collect();
    assert_eq!(attempts, vec![serde_json::json!(1), serde_json::json!(2)]);
}

#[tokio::test(start_paused = true)]
async fn final_checkpoint_is_complete_and_in_submission_order() {
    let ctx = mixed_batch();
    ctx.orchestrator.run(items(10), false).await.unwrap();

    let checkpoint = ctx.checkpoint();
    assert_eq!(checkpoint.version, CHECKPOINT_VERSION);
    assert_eq!(checkpoint.processed_keys.len(), 10);
    assert_eq!(checkpoint.cursor_index, 10);
    assert_eq!(
        result_keys(&checkpoint),
        (1..=10).map(|i| format!("item-{i}")).collect::<Vec<_>>()
    );
    assert_eq!(checkpoint.count(OutcomeKind::Succeeded), 9);
    assert_eq!(checkpoint.results_so_far[4].status, OutcomeKind::FailedPermanent);
    assert!(checkpoint.results_so_far[4].detail.contains("not a questionnaire"));
    assert_eq!(checkpoint.aggregate_snapshot["openness"].count, 9);
}

#[tokio::test(start_paused = true)]
async fn aggregate_covers_succeeded_items_only() {
    let ctx = mixed_batch();
    let summary = ctx.orchestrator.run(items(10), false).await.unwrap();

    assert_eq!(summary.aggregate.len(), 5);
    for dim in pj_core::BIG_FIVE {
        assert_eq!(summary.aggregate[dim].count, 9, "{dim}");
        assert_eq!(summary.aggregate[dim].mean, 3.0, "{dim}");
    }
}

#[tokio::test(start_paused = true)]
async fn progress_reports_final_counts() {
    let ctx = mixed_batch();
    let rx = ctx.orchestrator.subscribe();
    ctx.orchestrator.run(items(10), false).await.unwrap();

    let progress = *rx.borrow();
    assert_eq!(
        progress,
        Progress {
            total: 10,
            skipped: 0,
            completed: 10,
            succeeded: 9,
            failed: 1,
            in_flight: 0,
        }
    );
}

#[tokio::test(start_paused = true)]
async fn concurrency_never_exceeds_worker_limit() {
    let judge = FakeJudge::new().with_latency(Duration::from_millis(20));
    let ctx = setup(judge, config(3, 100));
    let summary = ctx.orchestrator.run(items(10), false).await.unwrap();

    assert_eq!(summary.succeeded, 10);
    assert_eq!(ctx.judge.max_in_flight(), 3);
    // One final write when the interval is never reached
    assert_eq!(summary.checkpoint_writes, 1);
}

#[tokio::test(start_paused = true)]
async fn results_keep_submission_order_when_completion_differs() {
    let judge = FakeJudge::new();
    // item-1 waits out a 60s backoff so it completes last
    judge.fail("item-1", unreachable());
    let ctx = setup(judge, config(4, 100));
    ctx.orchestrator.run(items(6), false).await.unwrap();

    assert_eq!(
        result_keys(&ctx.checkpoint()),
        vec!["item-1", "item-2", "item-3", "item-4", "item-5", "item-6"]
    );
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_are_failed_retryable() {
    let judge = FakeJudge::new();
    judge.fail_always("item-2", unreachable());
    let mut cfg = config(2, 10);
    cfg.retry = RetryPolicy::new(1, vec![Duration::from_secs(5)]);
    let ctx = setup(judge, cfg);

    let summary = ctx.orchestrator.run(items(3), false).await.unwrap();
    assert_eq!(summary.failed_retryable, 1);
    assert_eq!(ctx.judge.call_count("item-2"), 2);

    let checkpoint = ctx.checkpoint();
    assert!(!checkpoint.is_processed("item-2"));
    assert_eq!(checkpoint.results_so_far[1].status, OutcomeKind::FailedRetryable);
    assert!(checkpoint.results_so_far[1]
        .detail
        .contains("gave up after 2 attempts"));
    assert_eq!(checkpoint.cursor_index, 3);
}

#[tokio::test(start_paused = true)]
async fn empty_input_finishes_without_checkpoint() {
    let ctx = setup(FakeJudge::new(), config(2, 2));
    let summary = ctx.orchestrator.run(Vec::new(), false).await.unwrap();
    assert_eq!(summary.total, 0);
    assert_eq!(summary.checkpoint_writes, 0);
    assert!(!crate::paths::checkpoint_path(&ctx.output()).exists());
}
