use anyhow::Result;
use std::future::Future;
use tokio::time::{Duration, sleep};
use tracing::{debug, warn};

use crate::config::RetrySettings;

/// Retry configuration
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Base delay between retries (will be multiplied by 2^attempt)
    pub base_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryConfig {
    pub fn new(max_retries: u32, base_delay_ms: u64) -> Self {
        Self {
            max_retries,
            base_delay: Duration::from_millis(base_delay_ms),
            max_delay: Duration::from_secs(60),
        }
    }

    /// Build from the `[retry]` section of the project config
    pub fn from_settings(settings: &RetrySettings) -> Self {
        Self::new(settings.max_retries, settings.base_delay_ms)
    }

    /// Never retry
    pub fn none() -> Self {
        Self::new(0, 0)
    }

    /// Calculate delay for a given attempt (exponential backoff)
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self.base_delay * 2u32.saturating_pow(attempt);
        std::cmp::min(delay, self.max_delay)
    }
}

/// Retry a fallible async operation with exponential backoff.
///
/// Only errors accepted by [`is_retryable_error`] are retried; anything else
/// is returned immediately.
pub async fn retry_with_backoff<F, Fut, T>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    for attempt in 0..=config.max_retries {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    debug!(
                        operation = operation_name,
                        attempt, "operation succeeded after retry"
                    );
                }
                return Ok(result);
            }
            Err(e) => {
                if attempt >= config.max_retries || !is_retryable_error(&e) {
                    return Err(e);
                }

                let delay = config.delay_for_attempt(attempt);
                warn!(
                    operation = operation_name,
                    attempt,
                    max_retries = config.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "operation failed, retrying"
                );
                sleep(delay).await;
            }
        }
    }

    anyhow::bail!("{} was not attempted", operation_name)
}

/// Check if an error is retryable (transient errors)
pub fn is_retryable_error(error: &anyhow::Error) -> bool {
    // Match against the whole context chain, not just the outermost message
    let error_str = format!("{:#}", error).to_lowercase();

    // Network/connection errors
    if error_str.contains("connection")
        || error_str.contains("timeout")
        || error_str.contains("timed out")
        || error_str.contains("network")
    {
        return true;
    }

    // Rate limiting
    if error_str.contains("rate limit")
        || error_str.contains("too many requests")
        || error_str.contains("429")
    {
        return true;
    }

    // Server errors (5xx)
    if error_str.contains("500")
        || error_str.contains("502")
        || error_str.contains("503")
        || error_str.contains("504")
        || error_str.contains("internal server error")
        || error_str.contains("bad gateway")
        || error_str.contains("service unavailable")
    {
        return true;
    }

    // API overloaded
    if error_str.contains("overloaded") || error_str.contains("capacity") {
        return true;
    }

    false
}
