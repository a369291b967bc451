//! CLI help output specs
//!
//! Verify help text displays for all commands.

use crate::prelude::*;

#[test]
fn pj_no_args_shows_usage_and_exits_zero() {
    cli().passes().stdout_has("Usage:");
}

#[test]
fn pj_help_lists_subcommands() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("run")
        .stdout_has("status")
        .stdout_has("errors");
}

#[test]
fn pj_run_help_shows_flags() {
    cli()
        .args(&["run", "--help"])
        .passes()
        .stdout_has("--input")
        .stdout_has("--output")
        .stdout_has("--workers")
        .stdout_has("--checkpoint-interval")
        .stdout_has("--no-resume");
}

#[test]
fn pj_errors_help_shows_range_flags() {
    cli()
        .args(&["errors", "--help"])
        .passes()
        .stdout_has("--since")
        .stdout_has("--until")
        .stdout_has("--kind");
}

#[test]
fn pj_version_shows_version() {
    cli().args(&["--version"]).passes().stdout_has("0.1");
}

#[test]
fn pj_run_without_input_is_a_usage_error() {
    cli()
        .args(&["run"])
        .exits_with(1)
        .stderr_has("--input");
}
