//! Ticker HTTP Client
//!
//! A small, typed HTTP client for the Ticker polling service.
//!
//! # Example
//!
//! ```no_run
//! use ticker_client::TickerClient;
//! use ticker_core::dto::job::StartJob;
//!
//! # async fn example() -> ticker_client::Result<()> {
//! let client = TickerClient::new("http://localhost:5002");
//!
//! let ack = client.start_job(&StartJob {
//!     endpoint: "https://api.chucknorris.io/jokes/random".to_string(),
//!     frequency: 1.0,
//!     duration: 1.0,
//! }).await?;
//!
//! println!("{} (job {})", ack.message, ack.job_id);
//! # Ok(())
//! # }
//! ```

pub mod error;
mod jobs;

pub use error::{ClientError, Result};

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

/// HTTP client for the Ticker API
#[derive(Debug, Clone)]
pub struct TickerClient {
    /// Base URL of the server (e.g., "http://localhost:5002")
    base_url: String,
    /// Bearer token sent with job requests, if any
    token: Option<String>,
    /// HTTP client instance
    client: Client,
}

impl TickerClient {
    /// Create a new client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            client,
        }
    }

    /// Send `Authorization: Bearer <token>` with every request
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the base URL of the server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check that the server is up
    pub async fn health(&self) -> Result<()> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_empty_response(response).await
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Check the status code and deserialize a JSON body
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Check the status code of a response without a body
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(())
    }
}
