//! Exponential backoff with jitter for retryable report failures.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use super::error::FetchError;

/// Retry limits and delays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry (doubled for each later one).
    pub base_delay: Duration,
    /// Upper bound (inclusive) of the random jitter added to each delay.
    pub jitter_max: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(2000),
            jitter_max: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// What: Deterministic part of the delay before retry `attempt` (1-indexed).
    ///
    /// Output:
    /// - `base_delay * 2^(attempt-1)`; attempt `0` is treated as `1`.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1 << exp)
    }

    /// Backoff plus a random jitter in `0..=jitter_max`.
    #[must_use]
    pub fn delay_with_jitter(&self, attempt: u32) -> Duration {
        let jitter_cap = u64::try_from(self.jitter_max.as_millis()).unwrap_or(u64::MAX);
        let jitter_ms = if jitter_cap == 0 {
            0
        } else {
            rand::random_range(0..=jitter_cap)
        };
        self.backoff(attempt) + Duration::from_millis(jitter_ms)
    }
}

/// What: Run `operation` until it succeeds, fails non-retryably, or retries run out.
///
/// Inputs:
/// - `policy`: Retry limits and delays.
/// - `operation`: Produces one attempt's future.
///
/// Output:
/// - The first success, or the last error.
///
/// Details:
/// - Only errors with [`FetchError::is_retryable`] are retried.
/// - Sleeps `policy.delay_with_jitter(n)` before retry `n`.
pub async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < policy.max_retries => {
                attempt += 1;
                let delay = policy.delay_with_jitter(attempt);
                warn!(
                    error = %e,
                    attempt,
                    max_retries = policy.max_retries,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "report request failed, retrying with exponential backoff"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
