//! Embedding and text-generation providers for the originality checker.
//!
//! The scorer only ever sees the two traits defined here:
//!
//! * [`EmbeddingProvider`] turns text into a vector.
//! * [`GenerationProvider`] runs an instruction prompt over text.
//!
//! Two implementations ship with the crate. [`HttpProvider`] talks to a hosted
//! model API (Gemini by default, OpenAI-compatible, Hugging Face or a custom
//! JSON endpoint) behind retry, circuit breaker and rate limiting.
//! [`StubProvider`] produces deterministic hash-seeded vectors without touching
//! the network, which keeps tests and offline runs reproducible.
//!
//! ```no_run
//! use provider::{build_provider, ProviderConfig};
//!
//! # async fn demo() -> Result<(), provider::ProviderError> {
//! let handle = build_provider(&ProviderConfig::fast())?;
//! let vector = handle.embedder.embed("The quick brown fox").await?;
//! assert_eq!(vector.len(), 768);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

mod config;
mod error;
mod http;
mod normalize;
mod prompt;
pub mod resilience;
mod serde_millis;
mod stub;

pub use config::{ApiProviderKind, ProviderConfig, GEMINI_BASE_URL, HF_BASE_URL, OPENAI_BASE_URL};
pub use error::ProviderError;
pub use http::HttpProvider;
pub use prompt::PromptTemplate;
pub use resilience::{
    CircuitBreaker, CircuitBreakerConfig, CircuitState, RateLimitConfig, RateLimitStats,
    RetryConfig, TokenBucket,
};
pub use stub::StubProvider;

/// Something that maps text to a fixed-length vector.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError>;

    /// Circuit breaker state for remote providers, `None` when not applicable.
    fn circuit_state(&self) -> Option<CircuitState> {
        None
    }
}

/// Something that runs an instruction prompt over text and returns the reply.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, template: &PromptTemplate, text: &str) -> Result<String, ProviderError>;

    fn circuit_state(&self) -> Option<CircuitState> {
        None
    }
}

/// The pair of providers a configuration resolves to.
#[derive(Clone)]
pub struct ProviderHandle {
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub generator: Arc<dyn GenerationProvider>,
}

impl ProviderHandle {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, generator: Arc<dyn GenerationProvider>) -> Self {
        Self {
            embedder,
            generator,
        }
    }
}

impl fmt::Debug for ProviderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderHandle")
            .field("embedder", &self.embedder.name())
            .field("generator", &self.generator.name())
            .finish()
    }
}

/// Build the providers described by `cfg`.
///
/// `"fast"` mode yields the offline stub for both roles. `"api"` mode yields
/// one [`HttpProvider`] shared by both roles so they share a circuit breaker
/// and rate limit budget.
pub fn build_provider(cfg: &ProviderConfig) -> Result<ProviderHandle, ProviderError> {
    cfg.validate()?;
    match cfg.mode.to_ascii_lowercase().as_str() {
        "fast" | "stub" => {
            let stub = Arc::new(StubProvider::from_config(cfg));
            tracing::info!(dimension = stub.dimension(), "using offline stub provider");
            Ok(ProviderHandle {
                embedder: stub.clone(),
                generator: stub,
            })
        }
        _ => {
            let http = Arc::new(HttpProvider::new(cfg.clone())?);
            tracing::info!(
                provider = http.kind().as_str(),
                embedding_model = cfg.embedding_model(),
                generation_model = cfg.generation_model(),
                "using remote provider"
            );
            Ok(ProviderHandle {
                embedder: http.clone(),
                generator: http,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fast_mode_builds_stub() {
        let handle = build_provider(&ProviderConfig::fast()).unwrap();
        assert_eq!(handle.embedder.name(), "stub");
        assert_eq!(handle.generator.name(), "stub");
        assert!(handle.embedder.circuit_state().is_none());
    }

    #[test]
    fn api_mode_builds_http_provider() {
        let handle = build_provider(&ProviderConfig {
            api_provider: "openai".into(),
            ..ProviderConfig::default()
        })
        .unwrap();
        assert_eq!(handle.embedder.name(), "openai");
        assert_eq!(handle.embedder.circuit_state(), Some(CircuitState::Closed));
        assert!(format!("{handle:?}").contains("openai"));
    }

    #[test]
    fn invalid_mode_is_rejected() {
        let err = build_provider(&ProviderConfig {
            mode: "local".into(),
            ..ProviderConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn stub_handle_embeds() {
        let handle = build_provider(&ProviderConfig::fast()).unwrap();
        let v = handle.embedder.embed("hello").await.unwrap();
        assert_eq!(v.len(), 768);
    }
}
