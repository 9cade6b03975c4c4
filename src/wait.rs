// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Fixed-interval polling until a check succeeds or a deadline passes.
//!
//! There is no backoff and no jitter: the check is simply re-run every
//! `interval` until it returns `Ok` or `timeout` has elapsed.

use crate::constants::timeouts;
use crate::error::E2eError;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};
use tracing::debug;

/// Poll window for an eventually check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub timeout: Duration,
    pub interval: Duration,
}

impl PollConfig {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }
}

/// Builder for an eventually check
pub struct Eventually<F> {
    operation: String,
    check: F,
    poll: PollConfig,
}

/// Create an eventually check that re-runs `check` until it returns `Ok`
pub fn eventually<F, Fut, T, E>(operation: impl Into<String>, check: F) -> Eventually<F>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    Eventually {
        operation: operation.into(),
        check,
        poll: PollConfig::new(
            Duration::from_secs(timeouts::POLL_TIMEOUT_SECS),
            Duration::from_secs(timeouts::POLL_INTERVAL_SECS),
        ),
    }
}

impl<F> Eventually<F> {
    pub fn poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.poll.timeout = timeout;
        self
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.poll.interval = interval;
        self
    }

    /// Run the check until it succeeds, or fail with `Timeout` carrying the last error.
    ///
    /// The deadline bounds the attempts too: an attempt still running when the
    /// poll window closes is dropped.
    pub async fn await_condition<Fut, T, E>(self) -> Result<T, E2eError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let start = Instant::now();
        let deadline = start + self.poll.timeout;
        let mut attempts = 0u32;
        let mut last_error: Option<String> = None;

        loop {
            attempts += 1;

            let remaining = deadline.saturating_duration_since(Instant::now());
            match timeout(remaining, (self.check)()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) => {
                    let error = e.to_string();
                    debug!(
                        operation = %self.operation,
                        attempt = attempts,
                        "Check failed: {}", error
                    );
                    last_error = Some(error);
                }
                Err(_) => {
                    debug!(
                        operation = %self.operation,
                        attempt = attempts,
                        "Check still running at the deadline"
                    );
                    let error = match last_error {
                        Some(previous) => format!(
                            "attempt {} did not complete, previous attempt failed: {}",
                            attempts, previous
                        ),
                        None => format!("attempt {} did not complete", attempts),
                    };
                    return Err(self.timed_out(error));
                }
            }

            // Never sleep past the deadline
            let elapsed = start.elapsed();
            if elapsed + self.poll.interval > self.poll.timeout {
                let error = format!(
                    "{} (after {} attempts)",
                    last_error.unwrap_or_default(),
                    attempts
                );
                return Err(self.timed_out(error));
            }

            sleep(self.poll.interval).await;
        }
    }

    fn timed_out(self, last_error: String) -> E2eError {
        E2eError::Timeout {
            operation: self.operation,
            after: self.poll.timeout,
            last_error,
        }
    }
}
