//! API Module
//!
//! HTTP API layer for the server.
//! Each submodule handles endpoints for a specific concern.

pub mod auth;
pub mod error;
pub mod health;
pub mod job;
pub mod metrics;
pub mod start;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::metrics::Metrics;
use crate::service::JobController;

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<JobController>,
    pub metrics: Arc<Metrics>,
    /// Required bearer token on job routes, if any
    pub api_token: Option<Arc<str>>,
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(start::home))
        .route("/start", get(start::start_info).post(start::start_job))
        // Observability
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics::export))
        // Job endpoints
        .route("/jobs", get(job::list_jobs))
        .route("/jobs/{id}", get(job::get_job).delete(job::stop_job))
        // Add state and middleware
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
