//! Retry utilities for resilient network operations
//!
//! [`RetryPolicy`] wraps any fallible async operation with a bounded number
//! of attempts and exponential backoff. Errors are classified through
//! [`Retryable`]: a non-retryable failure aborts immediately, a retryable one
//! sleeps `retry_delay * 2^attempt` before the next attempt.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::utils::error::Retryable;

/// Bounded retry with exponential backoff
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total number of attempts (the first call included)
    max_retries: u32,

    /// Base delay, doubled after every failed attempt
    retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with `max_retries` attempts and the given base delay
    ///
    /// A `max_retries` of zero is treated as a single attempt.
    #[must_use]
    pub fn new(max_retries: u32, retry_delay: Duration) -> Self {
        Self {
            max_retries: max_retries.max(1),
            retry_delay,
        }
    }

    /// Maximum number of attempts
    #[must_use]
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Base delay between attempts
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Delay to wait after the attempt with index `attempt` failed
    ///
    /// `attempt` starts at 0, so the schedule is `d, 2d, 4d, ...`.
    #[must_use]
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.retry_delay.saturating_mul(factor)
    }

    /// Execute `operation` until it succeeds, fails fatally or attempts run out
    ///
    /// The last error is returned unchanged when every attempt failed.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use retrocrawl::utils::retry::RetryPolicy;
    /// use retrocrawl::utils::error::FetchError;
    /// use std::time::Duration;
    ///
    /// # async fn example() -> Result<(), FetchError> {
    /// let policy = RetryPolicy::new(3, Duration::from_secs(5));
    /// let body = policy
    ///     .execute(|| async { Ok::<_, FetchError>("<html></html>".to_string()) })
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn execute<T, E, F, Fut>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Retryable + Display,
    {
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => {
                    if attempt > 0 {
                        debug!(attempt, "Operation succeeded after retry");
                    }
                    return Ok(result);
                }
                Err(e) if !e.is_retryable() => {
                    warn!(error = %e, "Non-retryable error encountered");
                    return Err(e);
                }
                Err(e) => {
                    if attempt + 1 >= self.max_retries {
                        warn!(
                            attempts = self.max_retries,
                            error = %e,
                            "Operation failed after all retries"
                        );
                        return Err(e);
                    }

                    let delay = self.calculate_delay(attempt);
                    warn!(
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Connection error, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
