// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;
use yare::parameterized;

fn force_color() {
    std::env::set_var("COLOR", "1");
    std::env::remove_var("NO_COLOR");
}

#[test]
#[serial]
fn should_colorize_respects_no_color() {
    std::env::set_var("NO_COLOR", "1");
    std::env::set_var("COLOR", "1");
    assert!(!should_colorize(), "NO_COLOR=1 should override COLOR=1");
}

#[test]
#[serial]
fn should_colorize_respects_color_force() {
    force_color();
    assert!(should_colorize(), "COLOR=1 should force color on");
}

#[test]
#[serial]
fn context_produces_ansi_when_color_forced() {
    force_color();
    assert_eq!(context("[3/10]"), "\x1b[38;5;245m[3/10]\x1b[0m");
}

#[test]
#[serial]
fn helpers_plain_when_no_color() {
    std::env::set_var("NO_COLOR", "1");
    std::env::remove_var("COLOR");

    assert_eq!(context("baz"), "baz");
    assert_eq!(status("failed-permanent"), "failed-permanent");
}

#[parameterized(
    succeeded = { "succeeded", "\x1b[32m" },
    completed = { "completed", "\x1b[32m" },
    retryable = { "failed-retryable", "\x1b[33m" },
    interrupted = { "interrupted", "\x1b[33m" },
    permanent = { "failed-permanent", "\x1b[31m" },
    compound = { "failed-permanent: record is empty", "\x1b[31m" },
    mixed_case = { "Succeeded", "\x1b[32m" },
)]
fn status_colors(text: &str, code: &str) {
    let colored = apply_status(text);
    assert!(colored.starts_with(code), "{colored:?}");
    assert!(colored.contains(text));
    assert!(colored.ends_with(RESET));
}

#[test]
fn unknown_status_is_plain() {
    assert_eq!(apply_status("custom_status"), "custom_status");
}
