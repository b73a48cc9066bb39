use provider::ProviderError;
use serde::{Deserialize, Serialize};
use similarity::SimilarityError;
use thiserror::Error;

use crate::reference::ReferenceSet;

/// Longest text accepted by the public entry points, in characters.
pub const DEFAULT_MAX_TEXT_CHARS: usize = 3000;

/// Score at or above which a text is flagged as likely AI-generated.
pub const DEFAULT_LIKELY_AI_THRESHOLD: u8 = 25;

/// What to do when the provider cannot produce the data a score needs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Report a neutral 0 flagged as degraded and log a warning.
    #[default]
    Degrade,
    /// Return the provider error to the caller.
    FailFast,
}

/// Which [`ScoringStrategy`](crate::ScoringStrategy) the scorer is built with.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Embedding similarity against the reference exemplars.
    #[default]
    Embedding,
    /// Ask the generation model for a percentage directly.
    Direct,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Embedding => "embedding",
            StrategyKind::Direct => "direct",
        }
    }
}

/// Scoring configuration.
///
/// Serde-friendly so it can be embedded in the YAML document and the
/// server's layered config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoringConfig {
    #[serde(default)]
    pub strategy: StrategyKind,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    /// Embed the reference exemplars once and reuse them across requests.
    #[serde(default = "ScoringConfig::default_cache_reference_embeddings")]
    pub cache_reference_embeddings: bool,
    #[serde(default = "ScoringConfig::default_likely_ai_threshold")]
    pub likely_ai_threshold: u8,
    #[serde(default = "ScoringConfig::default_max_text_chars")]
    pub max_text_chars: usize,
    #[serde(default)]
    pub reference: ReferenceSet,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            failure_policy: FailurePolicy::default(),
            cache_reference_embeddings: Self::default_cache_reference_embeddings(),
            likely_ai_threshold: Self::default_likely_ai_threshold(),
            max_text_chars: Self::default_max_text_chars(),
            reference: ReferenceSet::default(),
        }
    }
}

impl ScoringConfig {
    pub(crate) fn default_cache_reference_embeddings() -> bool {
        true
    }

    pub(crate) fn default_likely_ai_threshold() -> u8 {
        DEFAULT_LIKELY_AI_THRESHOLD
    }

    pub(crate) fn default_max_text_chars() -> usize {
        DEFAULT_MAX_TEXT_CHARS
    }

    pub fn validate(&self) -> Result<(), ScoreError> {
        if self.likely_ai_threshold > 100 {
            return Err(ScoreError::InvalidConfig(
                "likely_ai_threshold must be between 0 and 100".into(),
            ));
        }
        if self.max_text_chars == 0 {
            return Err(ScoreError::InvalidConfig(
                "max_text_chars must be greater than zero".into(),
            ));
        }
        self.reference.validate()
    }
}

/// Outcome of one originality check.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OriginalityResult {
    /// Likelihood in percent that the text was machine-written.
    pub ai_percentage: u8,
    /// `ai_percentage` is at or above the configured threshold.
    pub likely_ai: bool,
    /// The score is the neutral fallback, not a computed value.
    pub degraded: bool,
}

impl OriginalityResult {
    pub fn computed(ai_percentage: u8, threshold: u8) -> Self {
        let ai_percentage = ai_percentage.min(100);
        Self {
            ai_percentage,
            likely_ai: ai_percentage >= threshold,
            degraded: false,
        }
    }

    pub fn degraded() -> Self {
        Self {
            ai_percentage: 0,
            likely_ai: false,
            degraded: true,
        }
    }
}

/// Outcome of one paraphrase request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ParaphraseResult {
    pub paraphrased_text: String,
    /// The provider failed and `paraphrased_text` is the input, unchanged.
    pub fell_back: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    Added,
    Removed,
    Unchanged,
}

/// A run of text that was added, removed, or kept between two versions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiffSegment {
    pub value: String,
    pub kind: DiffKind,
}

impl DiffSegment {
    pub fn new(kind: DiffKind, value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind,
        }
    }
}

/// Errors returned by the scorer.
#[derive(Debug, Error)]
pub enum ScoreError {
    /// The inputs cannot be scored (mismatched vector sizes, text too long).
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The embedding or generation provider failed.
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(#[from] ProviderError),
    #[error("invalid scorer config: {0}")]
    InvalidConfig(String),
}

impl From<SimilarityError> for ScoreError {
    fn from(value: SimilarityError) -> Self {
        match value {
            SimilarityError::InvalidInput { left, right } => ScoreError::InvalidInput(format!(
                "vector dimensions differ ({left} vs {right})"
            )),
        }
    }
}

/// Reject text longer than `max_chars` characters (not bytes).
pub fn validate_text_len(text: &str, max_chars: usize) -> Result<(), ScoreError> {
    let len = text.chars().count();
    if len > max_chars {
        return Err(ScoreError::InvalidInput(format!(
            "text is {len} characters long; the limit is {max_chars}"
        )));
    }
    Ok(())
}
