//! Error types for the Ticker client

use serde::Deserialize;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the Ticker client
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// `{ "error": ... }` body returned by the server
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl ClientError {
    /// Create an API error from a status code and raw response body
    ///
    /// The server's `{ "error": ... }` message is unwrapped when present.
    pub fn api_error(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or(body);

        Self::ApiError { status, message }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ApiError { status: 404, .. })
    }

    /// Check if the server rejected our credentials
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::ApiError { status: 401, .. })
    }

    /// Check if the request conflicted with current job state
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::ApiError { status: 409, .. })
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 400 && *status < 500)
    }
}
