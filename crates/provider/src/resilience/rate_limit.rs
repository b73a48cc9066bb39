//! Rate limiting for API providers.
//!
//! Token bucket: `burst_size` requests can go out at once, after which the
//! bucket refills at `requests_per_second`. Waiting is async so a throttled
//! provider never parks a runtime worker thread.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Configuration for rate limiting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Sustained request rate.
    pub requests_per_second: f64,
    /// Maximum requests that can be made instantly.
    pub burst_size: u64,
    /// Maximum wait for a token (0 = fail immediately when empty).
    #[serde(with = "crate::serde_millis")]
    pub max_wait: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 10.0,
            burst_size: 20,
            max_wait: Duration::from_secs(5),
        }
    }
}

impl RateLimitConfig {
    pub fn with_requests_per_second(mut self, rps: f64) -> Self {
        self.requests_per_second = rps;
        self
    }

    pub fn with_burst_size(mut self, burst: u64) -> Self {
        self.burst_size = burst;
        self
    }

    pub fn with_max_wait(mut self, wait: Duration) -> Self {
        self.max_wait = wait;
        self
    }
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_update: Instant,
}

/// Token bucket rate limiter.
#[derive(Debug)]
pub struct TokenBucket {
    config: RateLimitConfig,
    bucket: Mutex<Bucket>,
    total_requests: AtomicU64,
    total_waited: AtomicU64,
    total_rejected: AtomicU64,
}

impl TokenBucket {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            bucket: Mutex::new(Bucket {
                tokens: config.burst_size as f64,
                last_update: Instant::now(),
            }),
            total_requests: AtomicU64::new(0),
            total_waited: AtomicU64::new(0),
            total_rejected: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Bucket> {
        self.bucket
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Refill, then take a token if one is available. On failure returns
    /// how long until the next token.
    fn take(&self) -> Result<(), Duration> {
        let mut bucket = self.lock();

        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last_update).as_secs_f64();
        bucket.last_update = now;
        bucket.tokens =
            (bucket.tokens + elapsed * self.config.requests_per_second).min(self.config.burst_size as f64);

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            Ok(())
        } else if self.config.requests_per_second > 0.0 {
            let needed = 1.0 - bucket.tokens;
            Err(Duration::from_secs_f64(needed / self.config.requests_per_second))
        } else {
            Err(Duration::MAX)
        }
    }

    /// Try to acquire a token without waiting.
    pub fn try_acquire(&self) -> bool {
        self.total_requests.fetch_add(1, Ordering::SeqCst);
        if self.take().is_ok() {
            true
        } else {
            self.total_rejected.fetch_add(1, Ordering::SeqCst);
            false
        }
    }

    /// Acquire a token, waiting up to `max_wait`. Returns false on timeout.
    pub async fn acquire(&self) -> bool {
        self.total_requests.fetch_add(1, Ordering::SeqCst);
        let start = Instant::now();
        let mut waited = false;

        loop {
            match self.take() {
                Ok(()) => {
                    if waited {
                        self.total_waited.fetch_add(1, Ordering::SeqCst);
                    }
                    return true;
                }
                Err(until_next) => {
                    let remaining = self.config.max_wait.saturating_sub(start.elapsed());
                    if remaining.is_zero() {
                        self.total_rejected.fetch_add(1, Ordering::SeqCst);
                        return false;
                    }
                    waited = true;
                    // Re-check at least every 100ms.
                    let pause = until_next.min(remaining).min(Duration::from_millis(100));
                    tokio::time::sleep(pause).await;
                }
            }
        }
    }

    pub fn stats(&self) -> RateLimitStats {
        RateLimitStats {
            available_tokens: self.lock().tokens,
            total_requests: self.total_requests.load(Ordering::SeqCst),
            total_waited: self.total_waited.load(Ordering::SeqCst),
            total_rejected: self.total_rejected.load(Ordering::SeqCst),
        }
    }
}

/// Statistics for a rate limiter.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RateLimitStats {
    pub available_tokens: f64,
    pub total_requests: u64,
    pub total_waited: u64,
    pub total_rejected: u64,
}

impl RateLimitStats {
    /// Fraction of requests that were rejected (0.0 to 1.0).
    pub fn rejection_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.total_rejected as f64 / self.total_requests as f64
        }
    }
}

/// Rate limit configs matching common provider tiers.
pub mod presets {
    use super::*;

    /// Gemini API free tier (15 requests per minute on flash models).
    pub fn gemini_free() -> RateLimitConfig {
        RateLimitConfig {
            requests_per_second: 0.25,
            burst_size: 15,
            max_wait: Duration::from_secs(10),
        }
    }

    /// Gemini API paid tier.
    pub fn gemini_paid() -> RateLimitConfig {
        RateLimitConfig {
            requests_per_second: 30.0,
            burst_size: 60,
            max_wait: Duration::from_secs(10),
        }
    }

    /// OpenAI typical rate limits (moderate tier).
    pub fn openai() -> RateLimitConfig {
        RateLimitConfig {
            requests_per_second: 3.0,
            burst_size: 10,
            max_wait: Duration::from_secs(30),
        }
    }

    /// Local/self-hosted API.
    pub fn local_api() -> RateLimitConfig {
        RateLimitConfig {
            requests_per_second: 100.0,
            burst_size: 200,
            max_wait: Duration::from_secs(1),
        }
    }
}
