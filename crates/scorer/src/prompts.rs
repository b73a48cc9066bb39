//! Instruction prompts sent to the generation provider.

use provider::PromptTemplate;

const DIRECT_SCORE_INSTRUCTION: &str = "\
You are an expert in detecting AI-generated text. Analyze the following text and \
determine the probability that it was written by an AI.

Provide your answer as a percentage from 0 to 100, where 0 means it is definitely \
human-written and 100 means it is definitely AI-generated.

Respond with JSON only, in the form {\"aiPercentage\": <number>}.

Text to analyze:
{{text}}";

const PARAPHRASE_INSTRUCTION: &str = "\
Rewrite the following text so that it reads as if a person wrote it.

- Restructure the sentences instead of swapping single words.
- Prefer plain, everyday vocabulary over jargon.
- Use a natural, slightly informal, personal tone.
- Keep the original meaning intact.

Respond with JSON only, in the form {\"paraphrasedText\": \"...\"}, with no \
explanations or introductory phrases.

Original text:
{{text}}";

pub fn direct_score_prompt() -> PromptTemplate {
    PromptTemplate::new("direct_score", DIRECT_SCORE_INSTRUCTION).with_json_response(true)
}

pub fn paraphrase_prompt() -> PromptTemplate {
    PromptTemplate::new("paraphrase", PARAPHRASE_INSTRUCTION).with_json_response(true)
}

/// Strip a Markdown code fence (```json ... ```) if the model wrapped its answer in one.
pub(crate) fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening line.
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}
