//! `pj run` specs
//!
//! A full batch against the stub judge: counts, artifacts, exit codes.

use crate::prelude::*;

#[test]
fn run_scores_every_record_and_writes_artifacts() {
    let project = Project::with_stub_judge();
    project.records(3);

    project
        .run()
        .passes()
        .stdout_has(" completed in ")
        .stdout_has("  total:       3\n")
        .stdout_has("  succeeded:   3\n")
        .stdout_has("  failed:      0 (0 retryable, 0 permanent)\n")
        .stdout_has("  skipped:     0\n")
        .stdout_has("Aggregate: pj-output/aggregate.json")
        .stdout_has("openness");

    assert_eq!(project.judge_calls(), 3);
    assert!(project.path().join("pj-output/checkpoint.json").is_file());
    assert!(project.path().join("pj-output/pj.log").is_file());

    let aggregate: serde_json::Value =
        serde_json::from_str(&project.read("pj-output/aggregate.json").unwrap()).unwrap();
    assert_eq!(aggregate["openness"]["count"], 3);
    assert_eq!(aggregate["openness"]["mean"], 4.0);
    assert_eq!(aggregate["honesty"]["mean"], 2.0);
}

#[test]
fn run_honors_custom_output_directory() {
    let project = Project::with_stub_judge();
    project.records(2);

    project
        .pj()
        .args(&["run", "-i", "records/*.txt", "--output", "out/batch-1", "-q"])
        .passes()
        .stdout_has("Aggregate: out/batch-1/aggregate.json");

    assert!(project.path().join("out/batch-1/checkpoint.json").is_file());
    assert!(!project.path().join("pj-output").exists());
}

#[test]
fn run_json_reports_summary_and_aggregate_path() {
    let project = Project::with_stub_judge();
    project.records(2);

    let report = project.run().args(&["--format", "json"]).passes().stdout_json();
    assert_eq!(report["total"], 2);
    assert_eq!(report["succeeded"], 2);
    assert_eq!(report["interrupted"], false);
    assert_eq!(report["aggregate_path"], "pj-output/aggregate.json");
    assert_eq!(report["aggregate"]["honesty"]["count"], 2);
}

#[test]
fn rejected_record_fails_permanently_without_failing_the_run() {
    let project = Project::with_stub_judge();
    project.records(2);
    project.file("records/zz-bad.txt", "REJECT this one");

    project
        .run()
        .passes()
        .stdout_has("  succeeded:   2\n")
        .stdout_has("  failed:      1 (0 retryable, 1 permanent)\n")
        .stdout_has("Error journal: pj-output/errors (1 new entries)");

    // Permanent failures are not retried
    assert_eq!(project.judge_calls(), 3);
}

#[test]
fn unreachable_judge_is_retried_then_left_retryable() {
    let project = Project::with_stub_judge();
    project.records(1);
    project.file("records/zz-flaky.txt", "FLAKY backend");

    project
        .run()
        .passes()
        .stdout_has("  failed:      1 (1 retryable, 0 permanent)\n")
        .stdout_has("(2 new entries)");

    // One retry after the first attempt
    assert_eq!(project.judge_calls(), 3);
}

#[test]
fn blank_record_never_reaches_the_judge() {
    let project = Project::with_stub_judge();
    project.records(1);
    project.file("records/zz-blank.txt", "  \n\t\n");

    project
        .run()
        .passes()
        .stdout_has("  failed:      1 (0 retryable, 1 permanent)\n");

    assert_eq!(project.judge_calls(), 1);
}

#[test]
fn no_matching_inputs_exits_one() {
    let project = Project::with_stub_judge();

    project
        .run()
        .exits_with(1)
        .stderr_has("no input files matched records/*.txt");
}

#[test]
fn invalid_glob_exits_one() {
    let project = Project::with_stub_judge();

    project
        .pj()
        .args(&["run", "--input", "records/[.txt"])
        .exits_with(1)
        .stderr_has("invalid input pattern");
}
