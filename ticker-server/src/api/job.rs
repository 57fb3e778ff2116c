//! Job API Handlers
//!
//! Query and stop running jobs.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use ticker_core::domain::job::ScheduledJob;
use uuid::Uuid;

use crate::api::AppState;
use crate::api::auth::Authorized;
use crate::api::error::ApiResult;

/// GET /jobs
/// List all jobs, newest first
pub async fn list_jobs(State(state): State<AppState>, _auth: Authorized) -> Json<Vec<ScheduledJob>> {
    tracing::debug!("Listing all jobs");
    Json(state.controller.list_jobs())
}

/// GET /jobs/{id}
pub async fn get_job(
    State(state): State<AppState>,
    _auth: Authorized,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ScheduledJob>> {
    tracing::debug!("Getting job: {}", id);
    Ok(Json(state.controller.get_job(id)?))
}

/// DELETE /jobs/{id}
/// Stop a job before it expires
pub async fn stop_job(
    State(state): State<AppState>,
    _auth: Authorized,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    tracing::info!("Stopping job: {}", id);
    state.controller.stop_job(id)?;
    Ok(StatusCode::NO_CONTENT)
}
