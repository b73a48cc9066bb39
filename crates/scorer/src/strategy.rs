use async_trait::async_trait;
use futures::future::{try_join, try_join_all};
use provider::{EmbeddingProvider, GenerationProvider, PromptTemplate, ProviderError};
use serde_json::Value;
use similarity::{cosine_similarity, mean};
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::prompts::{direct_score_prompt, strip_code_fence};
use crate::reference::ReferenceSet;
use crate::types::ScoreError;

/// A way of turning text into a 0-100 AI-likelihood percentage.
///
/// Implementations report provider trouble as
/// [`ScoreError::ProviderUnavailable`]; the scorer decides whether that
/// degrades or propagates.
#[async_trait]
pub trait ScoringStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn score(&self, text: &str) -> Result<u8, ScoreError>;
}

/// Map mean similarities to the AI group and to the human group onto a percentage.
///
/// Both similarities are shifted from [-1, 1] into [0, 1]; the AI share of
/// their sum is the percentage, rounded and clamped to [0, 100].
pub fn percentage_from_similarities(sim_ai: f64, sim_human: f64) -> u8 {
    let norm_ai = (sim_ai + 1.0) / 2.0;
    let norm_human = (sim_human + 1.0) / 2.0;
    let total = norm_ai + norm_human;
    // Also catches NaN.
    if !(total > 0.0) {
        return 0;
    }
    (norm_ai / total * 100.0).round().clamp(0.0, 100.0) as u8
}

#[derive(Debug)]
struct ReferenceEmbeddings {
    ai: Vec<Vec<f32>>,
    human: Vec<Vec<f32>>,
}

/// Canonical strategy: cosine similarity of the input embedding against the
/// embeddings of every reference exemplar.
pub struct EmbeddingStrategy {
    embedder: Arc<dyn EmbeddingProvider>,
    reference: ReferenceSet,
    cache_enabled: bool,
    cache: OnceCell<Arc<ReferenceEmbeddings>>,
}

impl EmbeddingStrategy {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, reference: ReferenceSet) -> Self {
        Self {
            embedder,
            reference,
            cache_enabled: true,
            cache: OnceCell::new(),
        }
    }

    /// Toggle reuse of reference embeddings across calls.
    pub fn with_reference_cache(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    pub fn reference(&self) -> &ReferenceSet {
        &self.reference
    }

    /// Whether reference embeddings are cached and ready.
    pub fn is_warm(&self) -> bool {
        self.cache.initialized()
    }

    async fn embed_input(&self, text: &str) -> Result<Vec<f32>, ScoreError> {
        Ok(self.embedder.embed(text).await?)
    }

    async fn embed_reference(&self) -> Result<Arc<ReferenceEmbeddings>, ScoreError> {
        let ai = try_join_all(self.reference.ai_like().iter().map(|t| self.embedder.embed(t)));
        let human = try_join_all(
            self.reference
                .human_like()
                .iter()
                .map(|t| self.embedder.embed(t)),
        );
        let (ai, human) = try_join(ai, human).await?;
        Ok(Arc::new(ReferenceEmbeddings { ai, human }))
    }
}

fn group_similarity(input: &[f32], group: &[Vec<f32>]) -> Result<f64, ScoreError> {
    let sims = group
        .iter()
        .map(|exemplar| cosine_similarity(input, exemplar))
        .collect::<Result<Vec<f64>, _>>()?;
    mean(&sims).ok_or_else(|| ScoreError::InvalidConfig("reference group is empty".into()))
}

#[async_trait]
impl ScoringStrategy for EmbeddingStrategy {
    fn name(&self) -> &'static str {
        "embedding"
    }

    async fn score(&self, text: &str) -> Result<u8, ScoreError> {
        let (input, refs) = match self.cache.get() {
            Some(refs) => (self.embed_input(text).await?, Arc::clone(refs)),
            None => {
                // All embeddings fan out together; any failure fails the whole score.
                let (input, refs) = try_join(self.embed_input(text), self.embed_reference()).await?;
                if self.cache_enabled {
                    // A concurrent request may have won the race; either value is fine.
                    let _ = self.cache.set(Arc::clone(&refs));
                }
                (input, refs)
            }
        };

        let sim_ai = group_similarity(&input, &refs.ai)?;
        let sim_human = group_similarity(&input, &refs.human)?;
        let pct = percentage_from_similarities(sim_ai, sim_human);
        tracing::debug!(sim_ai, sim_human, pct, "embedding score");
        Ok(pct)
    }
}

/// Alternate strategy: ask the generation model for the percentage.
pub struct DirectQueryStrategy {
    generator: Arc<dyn GenerationProvider>,
    template: PromptTemplate,
}

impl DirectQueryStrategy {
    pub fn new(generator: Arc<dyn GenerationProvider>) -> Self {
        Self {
            generator,
            template: direct_score_prompt(),
        }
    }

    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }
}

#[async_trait]
impl ScoringStrategy for DirectQueryStrategy {
    fn name(&self) -> &'static str {
        "direct"
    }

    async fn score(&self, text: &str) -> Result<u8, ScoreError> {
        let raw = self.generator.generate(&self.template, text).await?;
        let pct = parse_ai_percentage(&raw)?;
        tracing::debug!(pct, "direct score");
        Ok(pct)
    }
}

/// Pull `aiPercentage` out of a model reply. Accepts numbers and numeric
/// strings, optionally inside a fenced code block.
pub fn parse_ai_percentage(raw: &str) -> Result<u8, ScoreError> {
    let malformed = |detail: String| {
        ScoreError::ProviderUnavailable(ProviderError::MalformedResponse(detail))
    };

    let body = strip_code_fence(raw);
    let value: Value = serde_json::from_str(body)
        .map_err(|e| malformed(format!("score reply is not JSON: {e}")))?;

    let pct = match value.get("aiPercentage") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|p| p.is_finite())
    .ok_or_else(|| malformed("score reply has no numeric aiPercentage".into()))?;

    Ok(pct.round().clamp(0.0, 100.0) as u8)
}
