// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use clap::Parser;
use yare::parameterized;

#[derive(Parser)]
struct Harness {
    #[command(flatten)]
    run: RunArgs,
}

fn parse(args: &[&str]) -> RunArgs {
    let argv = std::iter::once("pj-run").chain(args.iter().copied());
    Harness::try_parse_from(argv).unwrap().run
}

#[parameterized(
    default = { &["-i", "*.txt"], true },
    no_resume = { &["-i", "*.txt", "--no-resume"], false },
    last_flag_wins = { &["-i", "*.txt", "--no-resume", "--resume"], true },
    explicit_resume = { &["-i", "*.txt", "--resume"], true },
)]
fn resume_flag(args: &[&str], expected: bool) {
    assert_eq!(parse(args).resume(), expected);
}

#[test]
fn flags_become_overrides() {
    let args = parse(&[
        "-i",
        "a/*.txt",
        "--input",
        "b/*.txt",
        "-w",
        "3",
        "--checkpoint-interval",
        "4",
        "--max-retries",
        "0",
        "--output",
        "out",
    ]);
    assert_eq!(args.inputs, vec!["a/*.txt", "b/*.txt"]);
    assert_eq!(args.output, PathBuf::from("out"));
    let overrides = args.overrides();
    assert_eq!(overrides.workers, Some(3));
    assert_eq!(overrides.checkpoint_interval, Some(4));
    assert_eq!(overrides.max_retries, Some(0));
}

#[test]
fn input_is_required() {
    let argv = ["pj-run", "--output", "out"];
    assert!(Harness::try_parse_from(argv).is_err());
}

#[test]
fn output_defaults_to_pj_output() {
    assert_eq!(parse(&["-i", "x"]).output, PathBuf::from("pj-output"));
}

#[tokio::test]
async fn command_backend_builds_a_judge() {
    let settings = ConfigFile::parse("[judge]\nbackend = \"command\"\ncommand = \"false\"")
        .unwrap()
        .resolve(&Overrides::default())
        .unwrap();
    let judge = build_judge(&settings).unwrap();

    let err = judge
        .score(&pj_adapters::JudgeRequest::new("item-1", "answers"))
        .await
        .unwrap_err();
    assert_eq!(err.reason(), "unreachable");
}

#[test]
fn http_backend_builds_without_api_key() {
    let settings = ConfigFile::parse("[judge]\napi_key_env = \"PJ_TEST_UNSET_KEY\"")
        .unwrap()
        .resolve(&Overrides::default())
        .unwrap();
    assert!(build_judge(&settings).is_ok());
}
