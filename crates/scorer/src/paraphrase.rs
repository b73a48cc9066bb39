use provider::{GenerationProvider, PromptTemplate};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

use crate::metrics::metrics_recorder;
use crate::prompts::{paraphrase_prompt, strip_code_fence};
use crate::types::ParaphraseResult;

/// Rewrites text through the generation provider.
///
/// Never fails: when the provider errors or returns nothing usable the
/// caller gets its own text back with `fell_back` set.
pub struct Paraphraser {
    generator: Arc<dyn GenerationProvider>,
    template: PromptTemplate,
}

impl Paraphraser {
    pub fn new(generator: Arc<dyn GenerationProvider>) -> Self {
        Self {
            generator,
            template: paraphrase_prompt(),
        }
    }

    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    pub async fn paraphrase(&self, text: &str) -> ParaphraseResult {
        if text.trim().is_empty() {
            return ParaphraseResult {
                paraphrased_text: String::new(),
                fell_back: false,
            };
        }

        let start = Instant::now();
        let rewritten = match self.generator.generate(&self.template, text).await {
            Ok(raw) => {
                let extracted = extract_paraphrase(&raw);
                if extracted.is_none() {
                    tracing::warn!(
                        provider = self.generator.name(),
                        "paraphrase reply was empty, returning original text"
                    );
                }
                extracted
            }
            Err(err) => {
                tracing::warn!(
                    provider = self.generator.name(),
                    error = %err,
                    "paraphrase failed, returning original text"
                );
                None
            }
        };

        let result = match rewritten {
            Some(paraphrased_text) => ParaphraseResult {
                paraphrased_text,
                fell_back: false,
            },
            None => ParaphraseResult {
                paraphrased_text: text.to_string(),
                fell_back: true,
            },
        };

        if let Some(recorder) = metrics_recorder() {
            recorder.record_paraphrase(start.elapsed(), result.fell_back);
        }
        result
    }
}

/// The rewritten text from a model reply: the `paraphrasedText` field of a
/// JSON object, or the raw reply when it isn't JSON. `None` when empty.
fn extract_paraphrase(raw: &str) -> Option<String> {
    let body = strip_code_fence(raw);
    let text = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => map
            .get("paraphrasedText")
            .and_then(Value::as_str)
            .map(str::to_string),
        Ok(Value::String(s)) => Some(s),
        Ok(_) => None,
        Err(_) => Some(body.to_string()),
    }?;

    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
