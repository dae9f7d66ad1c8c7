//! Poll interval backoff and per-call retry

use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Attempts per status or results fetch before the poll cycle counts as failed
pub const POLL_RETRY_ATTEMPTS: u32 = 3;

/// Linear retry step; attempt `n` waits `n * POLL_RETRY_BASE_DELAY` before the next try
pub const POLL_RETRY_BASE_DELAY: Duration = Duration::from_millis(5_000);

/// Failed poll cycles in a row after which polling is abandoned
pub const MAX_CONSECUTIVE_POLL_FAILURES: u32 = 5;

/// Sleep before poll number `poll_count` (zero based):
/// `min(initial * 2^poll_count, max)`
pub fn poll_interval(initial: Duration, max: Duration, poll_count: u32) -> Duration {
    let factor = 2u32.checked_pow(poll_count).unwrap_or(u32::MAX);
    initial.saturating_mul(factor).min(max)
}

/// Linear retry for a single provider call
#[derive(Debug, Clone)]
pub struct LinearRetry {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay after failed attempt `n` is `n * base_delay`
    pub base_delay: Duration,
}

impl Default for LinearRetry {
    fn default() -> Self {
        Self {
            max_attempts: POLL_RETRY_ATTEMPTS,
            base_delay: POLL_RETRY_BASE_DELAY,
        }
    }
}

impl LinearRetry {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Delay after failed attempt `attempt` (one based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }

    /// Run `f` until it succeeds or `max_attempts` is exhausted; the last error
    /// is returned
    pub async fn call<F, Fut, R, E>(&self, operation: &str, mut f: F) -> Result<R, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<R, E>>,
        E: std::fmt::Display,
    {
        let mut attempt = 0;

        loop {
            attempt += 1;

            match f().await {
                Ok(result) => {
                    if attempt > 1 {
                        debug!(operation, attempt, "Retry succeeded");
                    }
                    return Ok(result);
                }
                Err(error) => {
                    if attempt >= self.max_attempts {
                        warn!(operation, attempt, %error, "All retry attempts failed");
                        return Err(error);
                    }

                    let delay = self.delay_after(attempt);
                    debug!(operation, attempt, %error, ?delay, "Attempt failed, retrying");
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
