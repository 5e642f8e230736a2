use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use serde_json::json;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub async fn root() -> impl IntoResponse {
    let body = json!({
        "service": "erpgraph",
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(body))
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

pub async fn readyz() -> impl IntoResponse {
    // The schema and storage are built before the router exists
    (StatusCode::OK, Json(HealthResponse { status: "ready" }))
}

/// Emits one log line at every level.
pub async fn test_log() -> impl IntoResponse {
    tracing::trace!("This is a TRACE message");
    tracing::debug!("This is a DEBUG message");
    tracing::info!("This is an INFO message");
    tracing::warn!("This is a WARNING message");
    tracing::error!("This is an ERROR message");
    (StatusCode::OK, "Logs have been generated.")
}
