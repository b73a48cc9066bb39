use std::sync::Arc;
use std::time::Instant;

use provider::ProviderHandle;

use crate::metrics::metrics_recorder;
use crate::strategy::{DirectQueryStrategy, EmbeddingStrategy, ScoringStrategy};
use crate::types::{
    FailurePolicy, OriginalityResult, ScoreError, ScoringConfig, StrategyKind,
    DEFAULT_LIKELY_AI_THRESHOLD,
};


/// Scores text for AI likelihood and applies the failure policy.
pub struct OriginalityScorer {
    strategy: Arc<dyn ScoringStrategy>,
    policy: FailurePolicy,
    likely_ai_threshold: u8,
}

impl OriginalityScorer {
    pub fn new(strategy: Arc<dyn ScoringStrategy>, policy: FailurePolicy) -> Self {
        Self {
            strategy,
            policy,
            likely_ai_threshold: DEFAULT_LIKELY_AI_THRESHOLD,
        }
    }

    /// Build the scorer described by `cfg` on top of `providers`.
    pub fn from_config(cfg: &ScoringConfig, providers: &ProviderHandle) -> Result<Self, ScoreError> {
        cfg.validate()?;
        let strategy: Arc<dyn ScoringStrategy> = match cfg.strategy {
            StrategyKind::Embedding => Arc::new(
                EmbeddingStrategy::new(Arc::clone(&providers.embedder), cfg.reference.clone())
                    .with_reference_cache(cfg.cache_reference_embeddings),
            ),
            StrategyKind::Direct => {
                Arc::new(DirectQueryStrategy::new(Arc::clone(&providers.generator)))
            }
        };
        Ok(Self::new(strategy, cfg.failure_policy).with_likely_ai_threshold(cfg.likely_ai_threshold))
    }

    pub fn with_likely_ai_threshold(mut self, threshold: u8) -> Self {
        self.likely_ai_threshold = threshold.min(100);
        self
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Score `text` from 0 (human) to 100 (machine).
    ///
    /// Empty or whitespace-only text scores 0 without a provider call.
    /// Provider failures follow the configured [`FailurePolicy`]; mismatched
    /// vector dimensions are always an error.
    pub async fn score_originality(&self, text: &str) -> Result<OriginalityResult, ScoreError> {
        if text.trim().is_empty() {
            return Ok(OriginalityResult::computed(0, self.likely_ai_threshold));
        }

        let start = Instant::now();
        let result = match self.strategy.score(text).await {
            Ok(pct) => OriginalityResult::computed(pct, self.likely_ai_threshold),
            Err(ScoreError::ProviderUnavailable(err)) if self.policy == FailurePolicy::Degrade => {
                tracing::warn!(
                    strategy = self.strategy.name(),
                    error = %err,
                    "provider unavailable, reporting neutral score"
                );
                OriginalityResult::degraded()
            }
            Err(err) => return Err(err),
        };

        if let Some(recorder) = metrics_recorder() {
            recorder.record_check(self.strategy.name(), start.elapsed(), &result);
        }
        Ok(result)
    }
}
