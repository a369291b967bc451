//! `pj errors` specs
//!
//! Journaled failures are listed by date range and kind.

use crate::prelude::*;

fn project_with_failures() -> Project {
    let project = Project::with_stub_judge();
    project.records(1);
    project.file("records/zz-bad.txt", "REJECT");
    project.file("records/zz-flaky.txt", "FLAKY");
    project.run().passes();
    project
}

#[test]
fn errors_lists_todays_entries() {
    let project = project_with_failures();

    project
        .pj()
        .args(&["errors"])
        .passes()
        .stdout_has("KIND")
        .stdout_has("malformed_input")
        .stdout_has("transient_judge")
        .stdout_has("records/zz-bad.txt")
        .stdout_has("records/zz-flaky.txt")
        .stdout_lacks("records/r00.txt");
}

#[test]
fn errors_json_carries_context() {
    let project = project_with_failures();

    let entries = project
        .pj()
        .args(&["errors", "--format", "json"])
        .passes()
        .stdout_json();
    let entries = entries.as_array().unwrap();
    // One permanent failure plus two attempts at the flaky record
    assert_eq!(entries.len(), 3);

    let rejected = entries
        .iter()
        .find(|e| e["error_kind"] == "malformed_input")
        .unwrap();
    assert_eq!(rejected["context"]["key"], "records/zz-bad.txt");
    assert_eq!(rejected["context"]["attempt"], 1);

    let attempts: Vec<_> = entries
        .iter()
        .filter(|e| e["error_kind"] == "transient_judge")
        .map(|e| e["context"]["attempt"].as_u64().unwrap())
        .collect();
    assert_eq!(attempts, vec![1, 2]);
}

#[test]
fn errors_filters_by_kind() {
    let project = project_with_failures();

    project
        .pj()
        .args(&["errors", "--kind", "malformed_input"])
        .passes()
        .stdout_has("records/zz-bad.txt")
        .stdout_lacks("transient_judge");
}

#[test]
fn errors_outside_range_prints_nothing() {
    let project = project_with_failures();

    project
        .pj()
        .args(&["errors", "--since", "2001-01-01", "--until", "2001-01-31"])
        .passes()
        .stdout_eq("")
        .stderr_has("No errors journaled");
}

#[test]
fn errors_rejects_malformed_date() {
    let project = project_with_failures();

    project
        .pj()
        .args(&["errors", "--since", "last tuesday"])
        .exits_with(1)
        .stderr_has("expected YYYY-MM-DD");
}

#[test]
fn errors_without_journal_is_empty() {
    let project = Project::empty();

    project
        .pj()
        .args(&["errors"])
        .passes()
        .stdout_eq("")
        .stderr_has("No errors journaled");
}
