//! Bounded retry with exponential backoff.
//!
//! Between attempt `n` and `n + 1` the sequence sleeps `base_delay * 2^(n - 1)`
//! on the tokio timer, so only the retrying task is suspended.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1000);

/// Failure of the whole retry sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryError<E> {
    /// Attempts actually made.
    pub attempts: u32,
    /// Error of the last attempt.
    pub last: E,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(1)
    }
}

impl RetryPolicy {
    /// A policy making at most `max_attempts` attempts (at least one).
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: DEFAULT_BASE_DELAY,
        }
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay after failed attempt `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay.saturating_mul(1u32 << exponent)
    }

    /// Run `operation`, retrying every failure until the budget is spent.
    pub async fn run<T, E, F, Fut>(&self, operation: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        self.run_if(operation, |_| true).await
    }

    /// Like [`run`](Self::run), but stops at the first error for which
    /// `should_retry` is false.
    pub async fn run_if<T, E, F, Fut, P>(
        &self,
        mut operation: F,
        should_retry: P,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: Display,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            if attempt > 1 {
                debug!(attempt, max_attempts = self.max_attempts, "Retrying operation");
            }

            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if attempt >= self.max_attempts || !should_retry(&err) {
                        warn!(
                            attempt,
                            max_attempts = self.max_attempts,
                            "Operation failed, giving up: {}",
                            err
                        );
                        return Err(RetryError {
                            attempts: attempt,
                            last: err,
                        });
                    }

                    let delay = self.delay_after(attempt);
                    warn!(
                        attempt,
                        backoff_ms = delay.as_millis() as u64,
                        "Operation failed, will retry after backoff: {}",
                        err
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

/// Retry every failure up to `max_attempts` times; `None` once exhausted.
///
/// The terminal failure is logged here; callers that need the error itself
/// should use [`RetryPolicy::run`].
pub async fn retry<T, E, F, Fut>(operation: F, max_attempts: u32, base_delay: Duration) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    RetryPolicy::new(max_attempts)
        .with_base_delay(base_delay)
        .run(operation)
        .await
        .ok()
}
