use crate::error::ServerResult;
use crate::routes::ensure_text_len;
use crate::state::ServerState;
use axum::extract::State;
use axum::Json;
use scorer::{diff_words, DiffSegment, OriginalityResult, ParaphraseResult, RewriteOutcome};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Request to paraphrase a text
#[derive(Debug, Deserialize)]
pub struct ParaphraseRequest {
    pub text: String,

    /// Score the paraphrase as well
    #[serde(default = "default_true")]
    pub recheck: bool,
}

fn default_true() -> bool {
    true
}

/// Paraphrase, word diff and (when rechecked) the paraphrase's score
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParaphraseResponse {
    #[serde(flatten)]
    pub paraphrase: ParaphraseResult,
    pub diff: Vec<DiffSegment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub originality: Option<OriginalityResult>,
}

impl From<RewriteOutcome> for ParaphraseResponse {
    fn from(outcome: RewriteOutcome) -> Self {
        Self {
            paraphrase: outcome.paraphrase,
            diff: outcome.diff,
            originality: Some(outcome.originality),
        }
    }
}

/// Paraphrase text to sound less machine-written.
///
/// # Example
/// ```json
/// // Request
/// { "text": "Furthermore, the results are significant.", "recheck": true }
///
/// // Response
/// {
///   "paraphrasedText": "The results matter, too.",
///   "fellBack": false,
///   "diff": [{ "value": "Furthermore, the results are significant.", "kind": "removed" }, ...],
///   "originality": { "aiPercentage": 18, "likelyAi": false, "degraded": false }
/// }
/// ```
///
/// A provider failure never fails the request: the text comes back
/// unchanged with `fellBack: true`.
pub async fn paraphrase(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<ParaphraseRequest>,
) -> ServerResult<Json<ParaphraseResponse>> {
    ensure_text_len(&state, &request.text)?;

    let response = if request.recheck {
        state.service.rewrite(&request.text).await?.into()
    } else {
        let paraphrase = state.service.paraphrase(&request.text).await;
        let diff = diff_words(&request.text, &paraphrase.paraphrased_text);
        ParaphraseResponse {
            paraphrase,
            diff,
            originality: None,
        }
    };

    Ok(Json(response))
}
