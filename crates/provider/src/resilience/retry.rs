//! Retry logic with exponential backoff for transient failures.
//!
//! Automatically retries failed operations with increasing delays to handle
//! temporary issues like network hiccups or rate limiting. Errors the caller
//! classifies as permanent stop the loop on the spot.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::{Duration, Instant};

/// Configuration for retry behavior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of retry attempts.
    pub max_retries: u32,
    /// Base delay between retries (exponentially increased).
    #[serde(with = "crate::serde_millis")]
    pub base_delay: Duration,
    /// Maximum delay between retries.
    #[serde(with = "crate::serde_millis")]
    pub max_delay: Duration,
    /// Whether to add random jitter to delays.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
            jitter: true,
        }
    }
}

impl RetryConfig {
    pub fn with_max_retries(mut self, max: u32) -> Self {
        self.max_retries = max;
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }
}

/// Result of a retry operation.
#[derive(Debug, Clone)]
pub struct RetryResult<T, E> {
    /// The final result (the first success, or the last error).
    pub result: Result<T, E>,
    /// Number of attempts made (1 = no retries needed).
    pub attempts: u32,
    /// Total duration spent on all attempts, sleeps included.
    pub total_duration: Duration,
}

impl<T, E> RetryResult<T, E> {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }

    pub fn into_result(self) -> Result<T, E> {
        self.result
    }
}

/// Execute an async operation with retry logic.
///
/// `should_retry` decides whether an error is worth another attempt. The
/// operation receives the zero-based attempt number.
///
/// ```ignore
/// let outcome = execute_with_retry_async(
///     &RetryConfig::default(),
///     |_attempt| async { client.call().await },
///     |err: &MyError| err.is_transient(),
/// )
/// .await;
/// ```
pub async fn execute_with_retry_async<T, E, F, Fut, R>(
    config: &RetryConfig,
    mut operation: F,
    should_retry: R,
) -> RetryResult<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
{
    let start = Instant::now();
    let mut attempt = 0u32;

    loop {
        match operation(attempt).await {
            Ok(value) => {
                return RetryResult {
                    result: Ok(value),
                    attempts: attempt + 1,
                    total_duration: start.elapsed(),
                };
            }
            Err(error) => {
                if attempt >= config.max_retries || !should_retry(&error) {
                    return RetryResult {
                        result: Err(error),
                        attempts: attempt + 1,
                        total_duration: start.elapsed(),
                    };
                }
                tokio::time::sleep(calculate_delay(config, attempt)).await;
                attempt += 1;
            }
        }
    }
}

/// Calculate delay for a retry attempt with exponential backoff.
fn calculate_delay(config: &RetryConfig, attempt: u32) -> Duration {
    let base = config.base_delay.as_millis() as u64;
    let exponential = base.saturating_mul(2_u64.saturating_pow(attempt));
    let delay = exponential.min(config.max_delay.as_millis() as u64);

    if config.jitter {
        // 0-50% on top
        let jitter = fastrand::u64(0..=delay / 2);
        Duration::from_millis(delay + jitter)
    } else {
        Duration::from_millis(delay)
    }
}

/// Check if a transport error message describes a transient failure.
pub fn is_retryable_error(error: &str) -> bool {
    let error_lower = error.to_lowercase();

    if error_lower.contains("timeout")
        || error_lower.contains("timed out")
        || error_lower.contains("connection")
        || error_lower.contains("reset")
        || error_lower.contains("temporarily")
        || error_lower.contains("unavailable")
        || error_lower.contains("503")
        || error_lower.contains("502")
        || error_lower.contains("429")
        || error_lower.contains("504")
        || error_lower.contains("408")
    {
        return true;
    }

    if error_lower.contains("401")
        || error_lower.contains("403")
        || error_lower.contains("404")
        || error_lower.contains("400")
        || error_lower.contains("invalid")
        || error_lower.contains("not found")
    {
        return false;
    }

    // Unknown transport errors get the benefit of the doubt.
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_config(max_retries: u32) -> RetryConfig {
        RetryConfig::default()
            .with_max_retries(max_retries)
            .with_base_delay(Duration::from_millis(1))
            .with_jitter(false)
    }

    #[tokio::test]
    async fn retry_succeeds_eventually() {
        let calls = AtomicU32::new(0);
        let result = execute_with_retry_async(
            &fast_config(3),
            |_attempt| {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n < 3 {
                        Err("not yet".to_string())
                    } else {
                        Ok("success")
                    }
                }
            },
            |_| true,
        )
        .await;

        assert!(result.succeeded());
        assert_eq!(result.attempts, 3);
        assert_eq!(result.into_result().unwrap(), "success");
    }

    #[tokio::test]
    async fn retry_fails_after_max_attempts() {
        let result: RetryResult<(), String> = execute_with_retry_async(
            &fast_config(2),
            |_| async { Err("always fails".to_string()) },
            |_| true,
        )
        .await;

        assert!(!result.succeeded());
        assert_eq!(result.attempts, 3); // initial + 2 retries
    }

    #[tokio::test]
    async fn permanent_error_stops_immediately() {
        let calls = AtomicU32::new(0);
        let result: RetryResult<(), String> = execute_with_retry_async(
            &fast_config(5),
            |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("HTTP 401".to_string()) }
            },
            |err| is_retryable_error(err),
        )
        .await;

        assert_eq!(result.attempts, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn attempt_numbers_are_passed_through() {
        let mut seen = Vec::new();
        let _: RetryResult<(), ()> = execute_with_retry_async(
            &fast_config(2),
            |attempt| {
                seen.push(attempt);
                async { Err(()) }
            },
            |_| true,
        )
        .await;
        assert_eq!(seen, vec![0, 1, 2]);
    }

    #[test]
    fn delay_grows_and_caps() {
        let cfg = RetryConfig::default()
            .with_base_delay(Duration::from_millis(100))
            .with_max_delay(Duration::from_millis(350))
            .with_jitter(false);
        assert_eq!(calculate_delay(&cfg, 0), Duration::from_millis(100));
        assert_eq!(calculate_delay(&cfg, 1), Duration::from_millis(200));
        assert_eq!(calculate_delay(&cfg, 2), Duration::from_millis(350));
        assert_eq!(calculate_delay(&cfg, 40), Duration::from_millis(350));
    }

    #[test]
    fn jitter_stays_within_half() {
        let cfg = RetryConfig::default()
            .with_base_delay(Duration::from_millis(100))
            .with_jitter(true);
        for _ in 0..50 {
            let d = calculate_delay(&cfg, 0);
            assert!(d >= Duration::from_millis(100) && d <= Duration::from_millis(150));
        }
    }

    #[test]
    fn is_retryable_error_detection() {
        assert!(is_retryable_error("timeout"));
        assert!(is_retryable_error("operation timed out"));
        assert!(is_retryable_error("connection reset"));
        assert!(is_retryable_error("HTTP 503"));
        assert!(is_retryable_error("HTTP 429"));
        assert!(is_retryable_error("service temporarily unavailable"));

        assert!(!is_retryable_error("HTTP 400"));
        assert!(!is_retryable_error("HTTP 401"));
        assert!(!is_retryable_error("HTTP 404"));
        assert!(!is_retryable_error("invalid api key"));
    }

    #[test]
    fn config_serde_uses_millis() {
        let cfg = RetryConfig::default().with_base_delay(Duration::from_millis(250));
        let json = serde_json::to_value(cfg).unwrap();
        assert_eq!(json["base_delay"], 250);

        let parsed: RetryConfig = serde_json::from_str(r#"{"max_retries": 1}"#).unwrap();
        assert_eq!(parsed.max_retries, 1);
        assert_eq!(parsed.base_delay, RetryConfig::default().base_delay);
    }
}
