//! Configuration specs
//!
//! `pj.toml` discovery, validation, and flag overrides.

use crate::prelude::*;

#[test]
fn invalid_value_exits_one() {
    let project = Project::with_stub_judge();
    project.records(1);
    project.file(
        "pj.toml",
        &STUB_CONFIG.replace("worker_limit = 2", "worker_limit = 0"),
    );

    project
        .run()
        .exits_with(1)
        .stderr_has("worker_limit must be at least 1");
    assert_eq!(project.judge_calls(), 0);
}

#[test]
fn unknown_key_exits_one() {
    let project = Project::with_stub_judge();
    project.records(1);
    project.file("pj.toml", "[batch]\nworkers = 3\n");

    project
        .run()
        .exits_with(1)
        .stderr_has("invalid config pj.toml");
}

#[test]
fn explicit_missing_config_exits_one() {
    let project = Project::with_stub_judge();
    project.records(1);

    project
        .run()
        .args(&["--config", "absent.toml"])
        .exits_with(1)
        .stderr_has("failed to read config absent.toml");
}

#[test]
fn explicit_config_replaces_discovered_one() {
    let project = Project::with_stub_judge();
    project.records(1);
    project.file("pj.toml", "[batch]\nworker_limit = 0\n");
    project.file("alt.toml", STUB_CONFIG);

    project
        .run()
        .args(&["-c", "alt.toml"])
        .passes()
        .stdout_has("  succeeded:   1\n");
}

#[test]
fn max_retries_flag_overrides_file() {
    let project = Project::with_stub_judge();
    project.file("records/flaky.txt", "FLAKY");

    project
        .run()
        .args(&["--max-retries", "0"])
        .passes()
        .stdout_has("(1 new entries)");
    assert_eq!(project.judge_calls(), 1);
}

#[test]
fn missing_judge_command_exits_one() {
    let project = Project::empty();
    project.records(1);
    project.file("pj.toml", "[judge]\nbackend = \"command\"\n");

    project.run().exits_with(1).stderr_has("judge.command");
}
