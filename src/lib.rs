//! Workspace umbrella crate for the originality checker.
//!
//! This crate stitches the provider clients and the scorer together so
//! callers can go from a YAML document to a ready [`OriginalityService`]
//! with a single call.
//!
//! ```no_run
//! use originality::{build_service, OriginalityConfig};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = OriginalityConfig::load()?;
//! let service = build_service(&config)?;
//!
//! let result = service.check_originality("Some text to look at.").await?;
//! println!("{}", serde_json::to_string(&result)?);
//! # Ok(())
//! # }
//! ```

pub mod config;

pub use crate::config::{ConfigLoadError, OriginalityConfig, CONFIG_PATH_ENV, DEFAULT_CONFIG_FILE};
pub use provider::{
    build_provider, ApiProviderKind, CircuitState, EmbeddingProvider, GenerationProvider,
    ProviderConfig, ProviderError, ProviderHandle,
};
pub use scorer::{
    diff_words, set_score_metrics, DiffKind, DiffSegment, FailurePolicy, OriginalityResult,
    OriginalityScorer, OriginalityService, ParaphraseResult, ReferenceSet, RewriteOutcome,
    ScoreError, ScoreMetrics, ScoringConfig, ScoringStrategy, StrategyKind,
};
pub use similarity::{cosine_similarity, SimilarityError};

use thiserror::Error;

/// Errors raised while turning a configuration into a running service.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error(transparent)]
    Config(#[from] ConfigLoadError),

    #[error("provider setup failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("scorer setup failed: {0}")]
    Scorer(#[from] ScoreError),
}

/// Build the provider clients and the service described by `config`.
pub fn build_service(config: &OriginalityConfig) -> Result<OriginalityService, SetupError> {
    config.validate()?;
    let providers = build_provider(&config.provider)?;
    let service = OriginalityService::from_config(&config.scoring, &providers)?;
    tracing::info!(
        mode = %config.provider.mode,
        api_provider = %config.provider.api_provider,
        strategy = config.scoring.strategy.as_str(),
        "originality service ready"
    );
    Ok(service)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_service_rejects_invalid_config() {
        let mut config = OriginalityConfig::default();
        config.version = "9".into();
        assert!(matches!(
            build_service(&config),
            Err(SetupError::Config(ConfigLoadError::UnsupportedVersion(_)))
        ));
    }

    #[test]
    fn build_service_from_fast_config() {
        let config = OriginalityConfig {
            provider: ProviderConfig::fast(),
            ..OriginalityConfig::default()
        };
        let service = build_service(&config).unwrap();
        assert_eq!(service.scorer().strategy_name(), "embedding");
        assert_eq!(service.max_text_chars(), 3000);
    }
}
