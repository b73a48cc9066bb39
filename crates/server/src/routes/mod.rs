//! API route handlers
//!
//! - `health`: liveness, readiness and Prometheus metrics
//! - `originality`: AI-likelihood checks
//! - `paraphrase`: paraphrase, diff and optional re-check

pub mod health;
pub mod originality;
pub mod paraphrase;

use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// API version and base info
///
/// Returns server information including version and available endpoints.
/// This is the root endpoint (GET /) and requires no authentication.
///
/// # Response
///
/// ```json
/// {
///   "name": "Originality Server",
///   "version": "0.1.0",
///   "api_version": "v1",
///   "endpoints": ["..."]
/// }
/// ```
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "Originality Server",
        "version": env!("CARGO_PKG_VERSION"),
        "api_version": "v1",
        "endpoints": [
            "/api/v1/originality",
            "/api/v1/paraphrase",
            "/health",
            "/ready",
            "/metrics"
        ]
    })))
}

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}

/// Reject text above the configured character bound.
pub(crate) fn ensure_text_len(state: &ServerState, text: &str) -> ServerResult<()> {
    let max = state.service.max_text_chars();
    let actual = text.chars().count();
    if actual > max {
        return Err(ServerError::TextTooLong { actual, max });
    }
    Ok(())
}
