// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution helpers

use std::io;
use std::process::{Output, Stdio};
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Default timeout for a judge command invocation.
pub const JUDGE_COMMAND_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Error)]
pub enum SubprocessError {
    #[error("{description} failed: {source}")]
    Io {
        description: String,
        source: io::Error,
    },
    #[error("{description} timed out after {}s", timeout.as_secs())]
    TimedOut {
        description: String,
        timeout: Duration,
    },
}

/// Run a subprocess with `input` on stdin, bounded by a timeout.
///
/// Stdin is fed concurrently with collecting output so a program that
/// writes before it finishes reading cannot deadlock on a full pipe. The
/// child is killed if the timeout elapses. A non-zero exit status is not an
/// error here; callers interpret it.
pub async fn run_with_input(
    mut cmd: Command,
    input: &[u8],
    timeout: Duration,
    description: &str,
) -> Result<Output, SubprocessError> {
    let io_err = |source| SubprocessError::Io {
        description: description.to_string(),
        source,
    };
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    let mut child = cmd.spawn().map_err(io_err)?;

    let stdin = child.stdin.take();
    let input = input.to_vec();
    let feed = async move {
        if let Some(mut stdin) = stdin {
            match stdin.write_all(&input).await {
                // The program exited without reading all of its input
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {}
                other => other?,
            }
        }
        Ok::<(), io::Error>(())
    };
    let run = async {
        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        fed?;
        output
    };

    match tokio::time::timeout(timeout, run).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(io_err(e)),
        Err(_elapsed) => Err(SubprocessError::TimedOut {
            description: description.to_string(),
            timeout,
        }),
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
