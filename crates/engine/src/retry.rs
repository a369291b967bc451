// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded retry with a fixed delay schedule.
//!
//! An operation is attempted up to `max_retries + 1` times. The delay
//! after failed attempt `k` (1-based) is `delays[k - 1]`, or the last
//! configured delay once the schedule runs out. Permanent errors end the
//! loop immediately. Backoff sleeps are cut short by cancellation.

use pj_adapters::JudgeError;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Errors that know whether another attempt could succeed
pub trait Retryable {
    fn is_permanent(&self) -> bool;
}

impl Retryable for JudgeError {
    fn is_permanent(&self) -> bool {
        JudgeError::is_permanent(self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub delays: Vec<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delays: vec![
                Duration::from_secs(60),
                Duration::from_secs(120),
                Duration::from_secs(180),
            ],
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delays: Vec<Duration>) -> Self {
        Self {
            max_retries,
            delays,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let index = attempt.saturating_sub(1) as usize;
        self.delays
            .get(index)
            .or_else(|| self.delays.last())
            .copied()
            .unwrap_or(Duration::ZERO)
    }
}

/// How a retried operation ended
#[derive(Debug, Clone, PartialEq)]
pub enum RetryOutcome<T, E> {
    Succeeded { value: T, attempts: u32 },
    /// Every attempt failed with a retryable error
    Exhausted { error: E, attempts: u32 },
    /// An attempt failed with an error no retry can fix
    Permanent { error: E, attempts: u32 },
    /// Cancelled while waiting to retry
    Cancelled { error: E, attempts: u32 },
}

impl<T, E> RetryOutcome<T, E> {
    pub fn attempts(&self) -> u32 {
        match self {
            RetryOutcome::Succeeded { attempts, .. }
            | RetryOutcome::Exhausted { attempts, .. }
            | RetryOutcome::Permanent { attempts, .. }
            | RetryOutcome::Cancelled { attempts, .. } => *attempts,
        }
    }
}

/// Run `operation` under `policy`.
///
/// `operation` receives the 1-based attempt number. `on_failure` is called
/// once for every failed attempt, before any backoff.
pub async fn execute_with_retry<T, E, F, Fut, L>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    mut operation: F,
    mut on_failure: L,
) -> RetryOutcome<T, E>
where
    E: Retryable + Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    L: FnMut(u32, &E),
{
    let max_attempts = policy.max_attempts();
    let mut attempt = 0;
    loop {
        attempt += 1;
        let error = match operation(attempt).await {
            Ok(value) => {
                return RetryOutcome::Succeeded {
                    value,
                    attempts: attempt,
                }
            }
            Err(error) => error,
        };
        on_failure(attempt, &error);

        if error.is_permanent() {
            tracing::error!(attempt, error = %error, "permanent failure, not retrying");
            return RetryOutcome::Permanent {
                error,
                attempts: attempt,
            };
        }
        if attempt >= max_attempts {
            tracing::warn!(attempt, error = %error, "retries exhausted");
            return RetryOutcome::Exhausted {
                error,
                attempts: attempt,
            };
        }

        let delay = policy.delay_after(attempt);
        tracing::warn!(
            attempt,
            max_attempts,
            delay_ms = delay.as_millis() as u64,
            error = %error,
            "attempt failed, will retry"
        );
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!(attempt, "retry cancelled during backoff");
                return RetryOutcome::Cancelled { error, attempts: attempt };
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
