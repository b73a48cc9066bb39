use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use provider::CircuitState;
use serde_json::json;
use std::sync::Arc;
use std::time::SystemTime;

/// Global server start time for uptime calculation
static SERVER_START_TIME: once_cell::sync::Lazy<SystemTime> =
    once_cell::sync::Lazy::new(SystemTime::now);

fn uptime_seconds() -> u64 {
    SERVER_START_TIME
        .elapsed()
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn circuit_label(state: Option<CircuitState>) -> &'static str {
    match state {
        None => "n/a",
        Some(CircuitState::Closed) => "closed",
        Some(CircuitState::HalfOpen) => "half_open",
        Some(CircuitState::Open) => "open",
    }
}

/// Health check endpoint (liveness)
/// Returns 200 if server is running
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "originality-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds(),
    }))
}

/// Readiness check endpoint
///
/// Reports the provider circuit breakers. An open embedding circuit means
/// checks are currently answered with degraded scores, so the instance is
/// reported as not ready (503).
pub async fn readiness_check(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let embedder = state.embedder_circuit();
    let generator = state.generator_circuit();
    let ready = embedder != Some(CircuitState::Open);

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if ready { "ready" } else { "degraded" },
            "service": "originality-server",
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "uptime_seconds": uptime_seconds(),
            "strategy": state.service.scorer().strategy_name(),
            "components": {
                "api": "ready",
                "embedder": {
                    "provider": state.providers.embedder.name(),
                    "circuit": circuit_label(embedder),
                },
                "generator": {
                    "provider": state.providers.generator.name(),
                    "circuit": circuit_label(generator),
                },
            }
        })),
    )
}

/// Prometheus metrics endpoint
pub async fn metrics(State(state): State<Arc<ServerState>>) -> ServerResult<impl IntoResponse> {
    let handle = state.metrics.as_ref().ok_or(ServerError::NotFound)?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    ))
}
