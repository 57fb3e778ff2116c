//! Metrics API Handler
//!
//! Prometheus text exposition of the process counters.

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::api::AppState;

/// GET /metrics
pub async fn export(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        state.metrics.export(),
    )
}
