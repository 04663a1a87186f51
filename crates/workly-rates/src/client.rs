//! JSON-over-HTTP capability used by the rate sources.

use crate::error::{RateError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Fetches a URL and decodes the body as JSON.
#[async_trait]
pub trait HttpJsonClient: Send + Sync {
    /// GET `url` with a per-request timeout.
    async fn get_json(&self, url: &str, timeout: Duration) -> Result<serde_json::Value>;
}

/// `reqwest`-backed client.
pub struct ReqwestJsonClient {
    client: Client,
}

impl ReqwestJsonClient {
    /// Create a client with a conservative overall timeout.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("workly/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RateError::Client(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpJsonClient for ReqwestJsonClient {
    async fn get_json(&self, url: &str, timeout: Duration) -> Result<serde_json::Value> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| RateError::Request {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RateError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.json().await.map_err(|e| RateError::Request {
            url: url.to_string(),
            message: format!("invalid JSON body: {e}"),
        })
    }
}
