use crate::error::ServerResult;
use crate::routes::ensure_text_len;
use crate::state::ServerState;
use axum::extract::State;
use axum::Json;
use scorer::OriginalityResult;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Request to score a single text
#[derive(Debug, Deserialize)]
pub struct OriginalityRequest {
    pub text: String,
}

/// Score plus the strategy that produced it
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginalityResponse {
    #[serde(flatten)]
    pub result: OriginalityResult,
    pub strategy: String,
}

/// Score text for AI likelihood.
///
/// # Example
/// ```json
/// // Request
/// { "text": "It is important to note that..." }
///
/// // Response
/// { "aiPercentage": 72, "likelyAi": true, "degraded": false, "strategy": "embedding" }
/// ```
///
/// Whitespace-only text scores 0 without touching the provider. When the
/// provider is down the default policy answers 0 with `degraded: true`.
pub async fn check_originality(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<OriginalityRequest>,
) -> ServerResult<Json<OriginalityResponse>> {
    ensure_text_len(&state, &request.text)?;

    let result = state.service.check_originality(&request.text).await?;
    tracing::debug!(
        ai_percentage = result.ai_percentage,
        degraded = result.degraded,
        chars = request.text.chars().count(),
        "originality checked"
    );

    Ok(Json(OriginalityResponse {
        result,
        strategy: state.service.scorer().strategy_name().to_string(),
    }))
}
