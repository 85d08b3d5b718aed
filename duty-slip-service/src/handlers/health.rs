use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use service_core::error::AppError;
use service_core::middleware::metrics::render_metrics;

pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "duty-slip-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Ready once the rate API answers; every other endpoint depends on it.
pub async fn readiness_check(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    state.rate_client.ping().await.map_err(|e| {
        tracing::warn!(error = %e, "Readiness check failed - rate API unavailable");
        AppError::ServiceUnavailable
    })?;

    tracing::debug!("Readiness check passed");
    Ok(Json(json!({ "status": "ready" })))
}

pub async fn metrics() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        render_metrics(),
    )
}
