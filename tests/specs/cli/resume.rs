//! Resume specs
//!
//! A second run over the same output directory picks up where the
//! checkpoint left off.

use crate::prelude::*;

#[test]
fn rerun_after_completion_calls_judge_for_nothing() {
    let project = Project::with_stub_judge();
    project.records(3);
    project.run().passes();
    project.reset_judge_calls();

    project
        .run()
        .passes()
        .stdout_has("  succeeded:   0\n")
        .stdout_has("  skipped:     3\n");

    assert_eq!(project.judge_calls(), 0);
}

#[test]
fn new_records_are_the_only_ones_scored() {
    let project = Project::with_stub_judge();
    project.records(3);
    project.run().passes();
    project.reset_judge_calls();

    project.records(5);
    project
        .run()
        .passes()
        .stdout_has("  total:       5\n")
        .stdout_has("  succeeded:   2\n")
        .stdout_has("  skipped:     3\n");

    assert_eq!(project.judge_calls(), 2);

    // The aggregate carries contributions from both runs
    let aggregate: serde_json::Value =
        serde_json::from_str(&project.read("pj-output/aggregate.json").unwrap()).unwrap();
    assert_eq!(aggregate["openness"]["count"], 5);
}

#[test]
fn retryable_failures_are_attempted_again() {
    let project = Project::with_stub_judge();
    project.records(2);
    project.file("records/zz-flaky.txt", "FLAKY backend");
    project.run().passes();
    project.reset_judge_calls();

    project
        .run()
        .passes()
        .stdout_has("  skipped:     2\n")
        .stdout_has("  failed:      1 (1 retryable, 0 permanent)\n");

    assert_eq!(project.judge_calls(), 2);
}

#[test]
fn permanent_failures_stay_skipped() {
    let project = Project::with_stub_judge();
    project.records(1);
    project.file("records/zz-bad.txt", "REJECT");
    project.run().passes();
    project.reset_judge_calls();

    project.run().passes().stdout_has("  skipped:     2\n");
    assert_eq!(project.judge_calls(), 0);
}

#[test]
fn no_resume_scores_everything_again() {
    let project = Project::with_stub_judge();
    project.records(3);
    project.run().passes();
    project.reset_judge_calls();

    project
        .run()
        .args(&["--no-resume"])
        .passes()
        .stdout_has("  succeeded:   3\n")
        .stdout_has("  skipped:     0\n");

    assert_eq!(project.judge_calls(), 3);
}

#[test]
fn corrupt_checkpoint_is_set_aside_and_run_starts_fresh() {
    let project = Project::with_stub_judge();
    project.records(2);
    project.file("pj-output/checkpoint.json", "{ not json");

    project.run().passes().stdout_has("  succeeded:   2\n");

    assert_eq!(project.judge_calls(), 2);
    assert_eq!(
        project.read("pj-output/checkpoint.bak").as_deref(),
        Some("{ not json")
    );
}
