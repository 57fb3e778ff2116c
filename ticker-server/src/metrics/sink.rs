//! Metric sinks
//!
//! Where counter increments go after the in-process counters are bumped.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;

/// Failure to deliver a metric increment
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("metrics request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("metrics backend rejected increment (status {status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Receives named counter increments
#[async_trait]
pub trait MetricsSink: Send + Sync {
    async fn increment(&self, namespace: &str, metric: &str, value: f64) -> Result<(), SinkError>;
}

/// Emits increments as structured log events
#[derive(Debug, Default, Clone)]
pub struct LogSink;

#[async_trait]
impl MetricsSink for LogSink {
    async fn increment(&self, namespace: &str, metric: &str, value: f64) -> Result<(), SinkError> {
        tracing::info!(namespace, metric, value, "metric increment");
        Ok(())
    }
}

/// Body posted to the metrics ingestion endpoint
#[derive(Debug, Serialize)]
struct MetricDatum<'a> {
    namespace: &'a str,
    metric_name: &'a str,
    value: f64,
}

/// Posts increments to an HTTP ingestion endpoint
#[derive(Debug, Clone)]
pub struct HttpSink {
    url: String,
    client: Client,
}

impl HttpSink {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            url: url.into(),
            client: Client::builder().timeout(timeout).build()?,
        })
    }
}

#[async_trait]
impl MetricsSink for HttpSink {
    async fn increment(&self, namespace: &str, metric: &str, value: f64) -> Result<(), SinkError> {
        let response = self
            .client
            .post(&self.url)
            .json(&MetricDatum {
                namespace,
                metric_name: metric,
                value,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SinkError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}
