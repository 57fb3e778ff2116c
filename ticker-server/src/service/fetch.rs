//! Fetch service
//!
//! Performs the single outbound GET of a poll cycle.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

/// A completed HTTP exchange, whatever its status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedResponse {
    pub status: u16,
    pub body: String,
}

/// Failure to complete an HTTP exchange with the target
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Service trait for fetching a target URL
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Issues one GET to `url`. Non-2xx responses are not errors.
    async fn fetch(&self, url: &str) -> Result<FetchedResponse, FetchError>;
}

/// reqwest-backed fetcher with a per-request timeout
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, timeout })
    }

    fn map_error(&self, url: &str, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                timeout: self.timeout,
            }
        } else {
            FetchError::Request {
                url: url.to_string(),
                source: err,
            }
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedResponse, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_error(url, e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.map_error(url, e))?;

        Ok(FetchedResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/jokes/random"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"value":"joke"}"#))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
        let response = fetcher
            .fetch(&format!("{}/jokes/random", server.uri()))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, r#"{"value":"joke"}"#);
    }

    #[tokio::test]
    async fn test_fetch_non_success_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
        let response = fetcher.fetch(&server.uri()).await.unwrap();

        assert_eq!(response.status, 404);
        assert_eq!(response.body, "missing");
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let fetcher = HttpFetcher::new(Duration::from_secs(5)).unwrap();
        let err = fetcher.fetch(&format!("http://{}/", addr)).await.unwrap_err();

        assert!(matches!(err, FetchError::Request { .. }));
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(Duration::from_millis(100)).unwrap();
        let err = fetcher.fetch(&server.uri()).await.unwrap_err();

        assert!(matches!(err, FetchError::Timeout { .. }));
    }
}
