//! Ticker Server
//!
//! HTTP service that polls caller-supplied URLs on a schedule, stores every
//! response body and counts calls and errors.
//!
//! Architecture:
//! - API: axum handlers for starting, listing and stopping jobs
//! - Services: job lifecycle and the outbound fetcher
//! - Scheduler: one task per job plus the registry that tracks them
//! - Repository: append-only storage of response bodies
//! - Metrics: process counters forwarded to a metrics sink

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod config;
pub mod db;
pub mod metrics;
pub mod repository;
pub mod scheduler;
pub mod service;

#[cfg(test)]
mod testing;

use crate::api::AppState;
use crate::config::Config;
use crate::metrics::{HttpSink, LogSink, Metrics, MetricsSink};
use crate::repository::PgRecordStore;
use crate::scheduler::PollServices;
use crate::service::JobController;
use crate::service::fetch::HttpFetcher;

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up a local .env before anything reads the environment
    let dotenv = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ticker_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Ticker Server...");
    if let Ok(path) = dotenv {
        tracing::info!("Loaded environment from {}", path.display());
    }

    let config = Config::from_env();
    config.validate().context("Invalid configuration")?;

    tracing::info!("Connecting to database...");

    let pool = db::create_pool(&config.database_url)
        .await
        .context("Failed to create database pool")?;

    tracing::info!("Database connection pool created");

    db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let sink: Arc<dyn MetricsSink> = match &config.metrics_url {
        Some(url) => {
            tracing::info!("Sending metrics to {}", url);
            let sink = HttpSink::new(url.clone(), config.fetch_timeout)
                .context("Failed to build metrics client")?;
            Arc::new(sink)
        }
        None => {
            tracing::info!("No metrics endpoint configured, logging metric increments");
            Arc::new(LogSink)
        }
    };
    let metrics = Arc::new(Metrics::new(config.metrics_namespace.clone(), sink));

    let fetcher = HttpFetcher::new(config.fetch_timeout).context("Failed to build HTTP client")?;
    let services = PollServices {
        fetcher: Arc::new(fetcher),
        store: Arc::new(PgRecordStore::new(pool)),
        metrics: Arc::clone(&metrics),
        store_timeout: config.store_timeout,
    };
    let controller = Arc::new(
        JobController::new(services, config.max_active_jobs)
            .with_retention(config.finished_job_retention),
    );

    if config.api_token.is_none() {
        tracing::warn!("TICKER_API_TOKEN not set, job routes are unauthenticated");
    }

    let app = api::create_router(AppState {
        controller: Arc::clone(&controller),
        metrics,
        api_token: config.api_token.as_deref().map(Arc::from),
    });

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    controller.shutdown();
    tracing::info!("Ticker Server stopped");

    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
