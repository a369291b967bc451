// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Judge backed by a local program.
//!
//! The record text is written to the program's stdin and the verdict is
//! read from stdout. `PJ_ITEM_KEY` carries the item key. Exit status 65
//! (`EX_DATAERR`) marks the record itself as unscorable.

use super::{parse_verdict, Judge, JudgeError, JudgeRequest};
use crate::subprocess::{run_with_input, SubprocessError, JUDGE_COMMAND_TIMEOUT};
use async_trait::async_trait;
use pj_core::ScoreRecord;
use std::time::Duration;
use tokio::process::Command;

const EX_DATAERR: i32 = 65;

#[derive(Debug, Clone)]
pub struct CommandJudge {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandJudge {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            timeout: JUDGE_COMMAND_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl Judge for CommandJudge {
    async fn score(&self, request: &JudgeRequest) -> Result<ScoreRecord, JudgeError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).env("PJ_ITEM_KEY", request.key.as_str());

        let output = run_with_input(cmd, request.text.as_bytes(), self.timeout, &self.program)
            .await
            .map_err(|e| match &e {
                SubprocessError::TimedOut { timeout, .. } => JudgeError::Timeout(*timeout),
                SubprocessError::Io { .. } => JudgeError::Unreachable(e.to_string()),
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        match output.status.code() {
            Some(0) => parse_verdict(&request.key, &String::from_utf8_lossy(&output.stdout)),
            Some(EX_DATAERR) => Err(JudgeError::InvalidInput(if stderr.is_empty() {
                format!("{} rejected the record", self.program)
            } else {
                stderr
            })),
            _ => Err(JudgeError::Unreachable(format!(
                "{} exited with {}: {}",
                self.program, output.status, stderr
            ))),
        }
    }
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod tests;
