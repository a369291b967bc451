// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error carrying a specific process exit code.

use std::fmt;

/// Exit code for configuration and usage errors.
pub const EXIT_USAGE: i32 = 1;
/// Exit code when the checkpoint store fails and the run aborts.
pub const EXIT_CHECKPOINT: i32 = 2;
/// Exit code after an interrupt signal (128 + SIGINT).
pub const EXIT_INTERRUPTED: i32 = 130;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ExitError {}
