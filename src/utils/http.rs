//! HTTP client utilities.

use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use crate::catalog::{CatalogError, RawResponse};
use crate::config::HttpConfig;

/// Shared HTTP client with sensible defaults
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Arc<Client>,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, CatalogError> {
        Self::with_settings(&HttpConfig::default())
    }

    /// Create a new HTTP client from configuration
    pub fn with_settings(settings: &HttpConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .connect_timeout(Duration::from_secs(settings.connect_timeout_seconds))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// GET a URL and keep the status and body whatever the status is
    pub async fn fetch(&self, url: &str) -> Result<RawResponse, CatalogError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/xml")
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.bytes().await?;

        Ok(RawResponse::new(status, body.to_vec()))
    }
}
