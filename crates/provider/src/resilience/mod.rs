//! API resilience patterns: circuit breaker, rate limiting, and retry logic.
//!
//! Hosted model APIs throttle, time out and return 503s under load. These
//! pieces keep a flaky provider from turning into a flood of retries.

mod circuit_breaker;
mod rate_limit;
mod retry;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use rate_limit::{presets, RateLimitConfig, RateLimitStats, TokenBucket};
pub use retry::{execute_with_retry_async, is_retryable_error, RetryConfig, RetryResult};
