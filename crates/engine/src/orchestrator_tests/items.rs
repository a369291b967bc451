// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-item failure handling

use super::*;

/// "你好世界" in GB18030
const GB18030_GREETING: &[u8] = &[0xC4, 0xE3, 0xBA, 0xC3, 0xCA, 0xC0, 0xBD, 0xE7];

fn with_gateway(dir: &Path, judge: FakeJudge, gateway: EncodingGateway) -> Orchestrator<FakeJudge> {
    Orchestrator::new(
        BatchDeps {
            judge,
            gateway,
            store: CheckpointStore::new(crate::paths::checkpoint_path(dir)),
            journal: ErrorJournal::new(crate::paths::journal_dir(dir)),
        },
        config(2, 10),
    )
    .unwrap()
}

#[tokio::test(start_paused = true)]
async fn file_records_are_decoded_before_scoring() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("agent-1.txt");
    std::fs::write(&path, GB18030_GREETING).unwrap();
    let judge = FakeJudge::new();
    let gateway = EncodingGateway::from_labels("utf-8", &["gb18030".into()])
        .unwrap()
        .without_detection();
    let orchestrator = with_gateway(dir.path(), judge.clone(), gateway);

    let summary = orchestrator.run(vec![WorkItem::file(&path)], false).await.unwrap();

    assert_eq!(summary.succeeded, 1);
    let calls = judge.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].text, "你好世界");
    assert_eq!(calls[0].key, path.to_string_lossy().as_ref());
}

#[tokio::test(start_paused = true)]
async fn undecodable_file_fails_permanently() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garbled.txt");
    std::fs::write(&path, b"\xC3\x28 scrambled").unwrap();
    let judge = FakeJudge::new();
    let gateway = EncodingGateway::from_labels("utf-8", &[])
        .unwrap()
        .without_detection();
    let orchestrator = with_gateway(dir.path(), judge.clone(), gateway);

    let summary = orchestrator
        .run(vec![WorkItem::file(&path), WorkItem::inline("fine", "text")], false)
        .await
        .unwrap();

    assert_eq!(summary.failed_permanent, 1);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(judge.call_count(&path.to_string_lossy()), 0);

    let entries = journal_entries(dir.path());
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].error_kind, "encoding");
    assert_eq!(entries[0].context["key"], path.to_string_lossy().as_ref());
}

#[tokio::test(start_paused = true)]
async fn missing_file_fails_permanently() {
    let ctx = setup(FakeJudge::new(), config(2, 10));
    let path = ctx.output().join("nowhere.txt");

    let summary = ctx.orchestrator.run(vec![WorkItem::file(&path)], false).await.unwrap();

    assert_eq!(summary.failed_permanent, 1);
    assert!(ctx.checkpoint().is_processed(&path.to_string_lossy()));
    assert_eq!(ctx.journal()[0].error_kind, "encoding");
}

#[tokio::test(start_paused = true)]
async fn blank_record_is_never_sent_to_judge() {
    let ctx = setup(FakeJudge::new(), config(2, 10));

    let summary = ctx
        .orchestrator
        .run(vec![WorkItem::inline("blank", " \n\t ")], false)
        .await
        .unwrap();

    assert_eq!(summary.failed_permanent, 1);
    assert!(ctx.judge.calls().is_empty());
    let entries = ctx.journal();
    assert_eq!(entries[0].error_kind, "malformed_input");
    assert_eq!(entries[0].message, "record is empty");
    assert_eq!(ctx.checkpoint().results_so_far[0].detail, "record is empty");
}

#[tokio::test(start_paused = true)]
async fn out_of_scale_verdict_is_retried() {
    let judge = FakeJudge::new();
    judge.respond(
        "item-1",
        pj_core::test_support::score_record("item-1", &[("openness", 9.0)]),
    );
    let ctx = setup(judge, config(1, 10));

    let summary = ctx.orchestrator.run(items(1), false).await.unwrap();

    assert_eq!(summary.succeeded, 1);
    assert_eq!(ctx.judge.call_count("item-1"), 2);
    let entries = ctx.journal();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].error_kind, "transient_judge");
    assert_eq!(entries[0].context["reason"], "malformed_output");
    assert!(entries[0].message.contains("outside scale"));
    assert_eq!(summary.aggregate["openness"].max, 3.0);
}

#[tokio::test(start_paused = true)]
async fn slow_judge_times_out() {
    let judge = FakeJudge::new().with_latency(Duration::from_secs(10));
    let mut cfg = config(1, 10);
    cfg.item_timeout = Duration::from_secs(1);
    cfg.retry = RetryPolicy::new(0, vec![]);
    let ctx = setup(judge, cfg);

    let summary = ctx.orchestrator.run(items(1), false).await.unwrap();

    assert_eq!(summary.failed_retryable, 1);
    assert_eq!(ctx.journal()[0].context["reason"], "timeout");
    assert!(!ctx.checkpoint().is_processed("item-1"));
}

#[tokio::test(start_paused = true)]
async fn duplicate_keys_are_scored_once() {
    let ctx = setup(FakeJudge::new(), config(2, 10));
    let mut batch = items(2);
    batch.push(WorkItem::inline("item-1", "a second copy"));

    let summary = ctx.orchestrator.run(batch, false).await.unwrap();

    assert_eq!(summary.total, 2);
    assert_eq!(ctx.judge.call_count("item-1"), 1);
    let calls = ctx.judge.calls();
    let first = calls.iter().find(|c| c.key == "item-1").unwrap();
    assert_eq!(first.text, "answers of agent 1");
}

/// Judge that panics while scoring one key
struct CrashingJudge {
    inner: FakeJudge,
    crash_on: &'static str,
}

#[async_trait::async_trait]
impl Judge for CrashingJudge {
    async fn score(
        &self,
        request: &pj_adapters::JudgeRequest,
    ) -> Result<pj_core::ScoreRecord, JudgeError> {
        if request.key == self.crash_on {
            panic!("judge bug");
        }
        self.inner.score(request).await
    }
}

#[tokio::test(start_paused = true)]
async fn panicking_judge_fails_only_its_item() {
    let dir = tempfile::tempdir().unwrap();
    let judge = CrashingJudge {
        inner: FakeJudge::new(),
        crash_on: "item-5",
    };
    let orchestrator = Orchestrator::new(
        BatchDeps {
            judge,
            gateway: EncodingGateway::default(),
            store: CheckpointStore::new(crate::paths::checkpoint_path(dir.path())),
            journal: ErrorJournal::new(crate::paths::journal_dir(dir.path())),
        },
        config(1, 100),
    )
    .unwrap();

    let summary = orchestrator.run(items(10), false).await.unwrap();

    assert_eq!(summary.succeeded, 9);
    assert_eq!(summary.failed_permanent, 1);

    let checkpoint = CheckpointStore::new(crate::paths::checkpoint_path(dir.path()))
        .load()
        .unwrap()
        .expect("checkpoint written");
    assert!(checkpoint.is_processed("item-5"));
    assert_eq!(checkpoint.cursor_index, 10);
    let crashed = &checkpoint.results_so_far[4];
    assert_eq!(crashed.status, OutcomeKind::FailedPermanent);
    assert_eq!(crashed.detail, "scoring crashed: judge bug");

    let entries = journal_entries(dir.path());
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].error_kind, "worker_panic");
    assert_eq!(entries[0].context["key"], "item-5");
}
