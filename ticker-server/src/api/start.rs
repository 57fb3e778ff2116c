//! Start API Handlers
//!
//! The welcome page and the `/start` polling endpoint.

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use ticker_core::dto::job::{MessageResponse, StartJob, StartJobResponse};

use crate::api::AppState;
use crate::api::auth::Authorized;
use crate::api::error::ApiResult;

pub const WELCOME: &str =
    "Welcome to the API Polling Backend! Use /start with a POST request or the React form.";

pub const START_USAGE: &str =
    "This endpoint accepts POST requests with JSON data. Use a form or tool like Postman.";

/// GET /
pub async fn home() -> &'static str {
    WELCOME
}

/// GET /start
/// Usage hint for people hitting the endpoint from a browser
pub async fn start_info() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: START_USAGE.to_string(),
    })
}

/// POST /start
/// Begin polling `endpoint` `frequency` times per hour for `duration` hours
pub async fn start_job(
    State(state): State<AppState>,
    _auth: Authorized,
    payload: Result<Json<StartJob>, JsonRejection>,
) -> ApiResult<Json<StartJobResponse>> {
    let Json(req) = payload?;
    tracing::info!("Starting job for endpoint: {}", req.endpoint);

    let job = state.controller.start_job(req.into())?;

    Ok(Json(StartJobResponse::running(job.id)))
}
