use thiserror::Error;

use crate::resilience::is_retryable_error;

/// Errors surfaced by embedding and generation providers.
///
/// Every variant means "the provider could not give us what we asked for".
/// The scorer treats all of them as the provider being unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Configuration is inconsistent (unknown mode, missing endpoint, ...).
    #[error("invalid provider config: {0}")]
    InvalidConfig(String),
    /// No API key for a provider that requires one.
    #[error("missing credentials: {0}")]
    MissingCredentials(String),
    /// Transport-level failure (DNS, connect, TLS, timeout).
    #[error("http request failed: {0}")]
    Http(String),
    /// The provider answered with a non-success status.
    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    /// The response body did not have the expected shape.
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
    /// Circuit breaker is open; the request was not attempted.
    #[error("circuit breaker is open for provider '{0}'")]
    CircuitOpen(String),
    /// No rate-limit token became available in time.
    #[error("rate limit exceeded for provider '{0}'")]
    RateLimited(String),
    /// The provider does not implement the requested capability.
    #[error("unsupported operation: {0}")]
    Unsupported(String),
}

impl ProviderError {
    /// Whether a retry has a reasonable chance of succeeding.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Http(msg) => is_retryable_error(msg),
            ProviderError::Status { status, .. } => {
                matches!(status, 408 | 429) || (500..600).contains(status)
            }
            ProviderError::InvalidConfig(_)
            | ProviderError::MissingCredentials(_)
            | ProviderError::MalformedResponse(_)
            | ProviderError::CircuitOpen(_)
            | ProviderError::RateLimited(_)
            | ProviderError::Unsupported(_) => false,
        }
    }

    /// Whether the failure should count against the circuit breaker.
    pub(crate) fn trips_circuit(&self) -> bool {
        matches!(
            self,
            ProviderError::Http(_) | ProviderError::Status { .. } | ProviderError::MalformedResponse(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = ProviderError::MissingCredentials("GEMINI_API_KEY is not set".into());
        assert!(err.to_string().contains("missing credentials"));
        assert!(err.to_string().contains("GEMINI_API_KEY"));

        let err = ProviderError::Status {
            status: 503,
            body: "overloaded".into(),
        };
        assert_eq!(err.to_string(), "provider returned HTTP 503: overloaded");

        let err = ProviderError::CircuitOpen("gemini".into());
        assert!(err.to_string().contains("'gemini'"));
    }

    #[test]
    fn status_retryability() {
        for status in [408u16, 429, 500, 502, 503, 504] {
            let err = ProviderError::Status {
                status,
                body: String::new(),
            };
            assert!(err.is_retryable(), "{status} should be retryable");
        }
        for status in [400u16, 401, 403, 404, 422] {
            let err = ProviderError::Status {
                status,
                body: String::new(),
            };
            assert!(!err.is_retryable(), "{status} should not be retryable");
        }
    }

    #[test]
    fn transport_retryability() {
        assert!(ProviderError::Http("operation timed out".into()).is_retryable());
        assert!(ProviderError::Http("connection refused".into()).is_retryable());
        assert!(!ProviderError::Http("invalid URL".into()).is_retryable());
    }

    #[test]
    fn permanent_failures_do_not_retry() {
        assert!(!ProviderError::MissingCredentials("x".into()).is_retryable());
        assert!(!ProviderError::MalformedResponse("x".into()).is_retryable());
        assert!(!ProviderError::Unsupported("x".into()).is_retryable());
        assert!(!ProviderError::CircuitOpen("x".into()).is_retryable());
    }

    #[test]
    fn only_remote_failures_trip_the_circuit() {
        assert!(ProviderError::Http("reset".into()).trips_circuit());
        assert!(ProviderError::MalformedResponse("x".into()).trips_circuit());
        assert!(!ProviderError::MissingCredentials("x".into()).trips_circuit());
        assert!(!ProviderError::RateLimited("x".into()).trips_circuit());
    }
}
