//! `pj status` specs

use crate::prelude::*;

#[test]
fn status_reports_checkpoint_counts() {
    let project = Project::with_stub_judge();
    project.records(2);
    project.file("records/zz-bad.txt", "REJECT");
    project.run().passes();

    project
        .pj()
        .args(&["status"])
        .passes()
        .stdout_has("(checkpoint v1, updated ")
        .stdout_has("  processed:   3\n")
        .stdout_has("  cursor:      3\n")
        .stdout_has("  succeeded:   2\n")
        .stdout_has("  failed-retryable: 0\n")
        .stdout_has("  failed-permanent: 1\n")
        .stdout_has("DIMENSION");
}

#[test]
fn status_json_includes_checkpoint_and_aggregate() {
    let project = Project::with_stub_judge();
    project.records(2);
    project.run().passes();

    let status = project
        .pj()
        .args(&["status", "-o", "json"])
        .passes()
        .stdout_json();
    assert_eq!(status["checkpoint"]["processed_keys"].as_array().unwrap().len(), 2);
    assert_eq!(status["checkpoint"]["results_so_far"].as_array().unwrap().len(), 2);
    assert_eq!(status["aggregate"]["openness"]["count"], 2);
}

#[test]
fn status_without_checkpoint_fails() {
    let project = Project::with_stub_judge();

    project
        .pj()
        .args(&["status"])
        .exits_with(1)
        .stderr_has("no checkpoint found at pj-output/checkpoint.json");
}

#[test]
fn status_leaves_corrupt_checkpoint_in_place() {
    let project = Project::with_stub_judge();
    project.file("pj-output/checkpoint.json", "garbage");

    project.pj().args(&["status"]).exits_with(1);

    assert_eq!(project.read("pj-output/checkpoint.json").as_deref(), Some("garbage"));
    assert!(project.read("pj-output/checkpoint.bak").is_none());
}
