//! Configuration module
//!
//! Handles CLI configuration: which server to talk to and how to authenticate.

use ticker_client::TickerClient;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the Ticker server
    pub server_url: String,

    /// Bearer token for job routes
    pub token: Option<String>,
}

impl Config {
    /// Build an API client for this configuration
    pub fn client(&self) -> TickerClient {
        let client = TickerClient::new(&self.server_url);
        match &self.token {
            Some(token) => client.with_token(token),
            None => client,
        }
    }
}
