//! Retry with exponential backoff on rate-limit signals.
//!
//! Only failures that report [`RateLimitSignal::is_rate_limited`] are retried.
//! Any other failure is returned straight away. Attempts never overlap: the
//! next attempt starts only after the previous one resolved and the backoff
//! delay elapsed.
//!
//! ```rust
//! use promptcraft_core::retry::{retry_with_backoff, RetryPolicy};
//! use promptcraft_core::Error;
//!
//! # async fn demo() -> promptcraft_core::Result<()> {
//! let policy = RetryPolicy::default();
//! let value = retry_with_backoff(&policy, || async { Ok::<_, Error>(42) }).await?;
//! assert_eq!(value, 42);
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::defaults;
use crate::error::Error;

/// Failure types that can carry an upstream rate-limit (HTTP 429) signal.
pub trait RateLimitSignal {
    fn is_rate_limited(&self) -> bool;
}

impl RateLimitSignal for Error {
    fn is_rate_limited(&self) -> bool {
        Error::is_rate_limited(self)
    }
}

/// Bounds for one retried operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt.
    pub max_retries: u32,
    /// Wait before the first retry; doubled for each subsequent retry.
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: defaults::MAX_RETRIES,
            initial_delay: Duration::from_millis(defaults::INITIAL_RETRY_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
        }
    }

    /// Delay waited before retry number `retry` (1-based).
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry.saturating_sub(1)).unwrap_or(u32::MAX);
        self.initial_delay.saturating_mul(factor)
    }

    /// Sum of every backoff delay when all retries are used.
    pub fn total_backoff(&self) -> Duration {
        (1..=self.max_retries)
            .map(|retry| self.delay_for_retry(retry))
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

/// Emitted just before the helper sleeps ahead of a retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryEvent {
    /// Attempt number about to run (2 for the first retry).
    pub next_attempt: u32,
    /// Retries still available after this one.
    pub retries_left: u32,
    /// Backoff waited before `next_attempt`.
    pub delay: Duration,
}

/// Run `operation`, retrying rate-limited failures with exponential backoff.
pub async fn retry_with_backoff<T, E, F, Fut>(policy: &RetryPolicy, operation: F) -> Result<T, E>
where
    E: RateLimitSignal + std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    retry_with_backoff_observed(policy, operation, |_| {}).await
}

/// Same as [`retry_with_backoff`], reporting each scheduled retry to `on_retry`.
pub async fn retry_with_backoff_observed<T, E, F, Fut, O>(
    policy: &RetryPolicy,
    mut operation: F,
    mut on_retry: O,
) -> Result<T, E>
where
    E: RateLimitSignal + std::fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    O: FnMut(RetryEvent),
{
    let mut retries_left = policy.max_retries;
    let mut delay = policy.initial_delay;
    let mut attempt: u32 = 1;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "Operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) if err.is_rate_limited() && retries_left > 0 => {
                retries_left -= 1;
                attempt += 1;
                warn!(
                    attempt,
                    retries_left,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Rate limited, backing off before retry"
                );
                on_retry(RetryEvent {
                    next_attempt: attempt,
                    retries_left,
                    delay,
                });
                tokio::time::sleep(delay).await;
                delay = delay.saturating_mul(2);
            }
            Err(err) => {
                if err.is_rate_limited() {
                    warn!(attempt, error = %err, "Rate limited and retries exhausted");
                }
                return Err(err);
            }
        }
    }
}
