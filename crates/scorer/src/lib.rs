//! # Originality scorer (`scorer`)
//!
//! ## Purpose
//!
//! `scorer` turns a piece of text into an "AI likelihood" percentage and
//! offers a paraphrase of it. It sits on top of the `provider` crate, which
//! hides the remote model service, and the `similarity` crate, which does
//! the vector arithmetic.
//!
//! ## Scoring
//!
//! The canonical [`EmbeddingStrategy`] embeds the input together with a
//! [`ReferenceSet`] of "AI-like" and "human-like" exemplars, averages the
//! cosine similarities per group, shifts both means into `[0, 1]` and
//! reports the AI share of their sum. [`DirectQueryStrategy`] instead asks
//! the generation model for a number.
//!
//! Whatever the strategy, [`OriginalityScorer`] applies the
//! [`FailurePolicy`]: by default a provider outage yields a neutral 0
//! flagged as `degraded` instead of an error.
//!
//! ## Paraphrasing
//!
//! [`Paraphraser`] never fails. If the provider is down the caller gets its
//! own text back with `fell_back` set. [`OriginalityService::rewrite`] chains
//! paraphrase, [`diff_words`] and a re-score.
//!
//! ## Example Usage
//!
//! ```no_run
//! use provider::{build_provider, ProviderConfig};
//! use scorer::{OriginalityService, ScoringConfig};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let providers = build_provider(&ProviderConfig::fast())?;
//! let service = OriginalityService::from_config(&ScoringConfig::default(), &providers)?;
//!
//! let result = service.check_originality("Some text to look at.").await?;
//! println!("{}% (likely AI: {})", result.ai_percentage, result.likely_ai);
//! # Ok(())
//! # }
//! ```
//!
//! ## Observability
//!
//! Install a [`ScoreMetrics`] implementation via [`set_score_metrics`] to
//! record check latency, degraded results and paraphrase fallbacks.

pub mod diff;
pub mod engine;
pub mod metrics;
pub mod paraphrase;
pub mod prompts;
pub mod reference;
pub mod service;
pub mod strategy;
pub mod types;

pub use crate::diff::diff_words;
pub use crate::engine::OriginalityScorer;
pub use crate::metrics::{set_score_metrics, ScoreMetrics};
pub use crate::paraphrase::Paraphraser;
pub use crate::reference::ReferenceSet;
pub use crate::service::{OriginalityService, RewriteOutcome};
pub use crate::strategy::{
    parse_ai_percentage, percentage_from_similarities, DirectQueryStrategy, EmbeddingStrategy,
    ScoringStrategy,
};
pub use crate::types::{
    validate_text_len, DiffKind, DiffSegment, FailurePolicy, OriginalityResult, ParaphraseResult,
    ScoreError, ScoringConfig, StrategyKind, DEFAULT_LIKELY_AI_THRESHOLD, DEFAULT_MAX_TEXT_CHARS,
};
