use provider::ProviderHandle;
use serde::{Deserialize, Serialize};

use crate::diff::diff_words;
use crate::engine::OriginalityScorer;
use crate::paraphrase::Paraphraser;
use crate::types::{
    validate_text_len, DiffSegment, OriginalityResult, ParaphraseResult, ScoreError,
    ScoringConfig, DEFAULT_MAX_TEXT_CHARS,
};

/// A paraphrase together with what changed and how the rewrite scores.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RewriteOutcome {
    #[serde(flatten)]
    pub paraphrase: ParaphraseResult,
    pub diff: Vec<DiffSegment>,
    pub originality: OriginalityResult,
}

/// The two user-facing operations plus the check, rewrite, re-check flow.
pub struct OriginalityService {
    scorer: OriginalityScorer,
    paraphraser: Paraphraser,
    max_text_chars: usize,
}

impl OriginalityService {
    pub fn new(scorer: OriginalityScorer, paraphraser: Paraphraser) -> Self {
        Self {
            scorer,
            paraphraser,
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
        }
    }

    pub fn from_config(cfg: &ScoringConfig, providers: &ProviderHandle) -> Result<Self, ScoreError> {
        let scorer = OriginalityScorer::from_config(cfg, providers)?;
        let paraphraser = Paraphraser::new(providers.generator.clone());
        Ok(Self {
            scorer,
            paraphraser,
            max_text_chars: cfg.max_text_chars,
        })
    }

    pub fn with_max_text_chars(mut self, max_text_chars: usize) -> Self {
        self.max_text_chars = max_text_chars;
        self
    }

    pub fn scorer(&self) -> &OriginalityScorer {
        &self.scorer
    }

    pub fn max_text_chars(&self) -> usize {
        self.max_text_chars
    }

    /// Enforce the input size bound. Callers run this before the operations below.
    pub fn validate_input(&self, text: &str) -> Result<(), ScoreError> {
        validate_text_len(text, self.max_text_chars)
    }

    pub async fn check_originality(&self, text: &str) -> Result<OriginalityResult, ScoreError> {
        self.scorer.score_originality(text).await
    }

    pub async fn paraphrase(&self, text: &str) -> ParaphraseResult {
        self.paraphraser.paraphrase(text).await
    }

    /// Paraphrase, diff against the original, and score the rewrite.
    pub async fn rewrite(&self, text: &str) -> Result<RewriteOutcome, ScoreError> {
        let paraphrase = self.paraphraser.paraphrase(text).await;
        let diff = diff_words(text, &paraphrase.paraphrased_text);
        let originality = self
            .scorer
            .score_originality(&paraphrase.paraphrased_text)
            .await?;
        tracing::debug!(
            fell_back = paraphrase.fell_back,
            segments = diff.len(),
            ai_percentage = originality.ai_percentage,
            "rewrite finished"
        );
        Ok(RewriteOutcome {
            paraphrase,
            diff,
            originality,
        })
    }
}
