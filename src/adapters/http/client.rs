//! HTTP JSON Fetcher
//!
//! reqwest-backed implementation of [`JsonFetcher`] with a bounded request
//! timeout and an optional API-key header. There is no retry: a failed
//! request is logged and reported as `None`, and the next refresh cycle is
//! the only retry.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::ports::JsonFetcher;

/// Errors raised inside the fetcher before they are collapsed to `None`
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status { status: StatusCode, url: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// Configuration for the HttpFetcher
#[derive(Debug, Clone)]
pub struct HttpFetcherConfig {
    /// Request timeout
    pub timeout: Duration,
    /// Header name carrying the API key
    pub api_key_header: String,
    /// Optional API key
    pub api_key: Option<String>,
}

impl Default for HttpFetcherConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(9),
            api_key_header: "X-API-Key".to_string(),
            api_key: None,
        }
    }
}

impl HttpFetcherConfig {
    /// Config sending `api_key` in the default header
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// JSON fetcher over HTTP GET
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    config: HttpFetcherConfig,
    http: Client,
}

impl HttpFetcher {
    /// Create a fetcher with default configuration
    pub fn new() -> Result<Self, FetchError> {
        Self::with_config(HttpFetcherConfig::default())
    }

    /// Create a fetcher with custom configuration
    pub fn with_config(config: HttpFetcherConfig) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self { config, http })
    }

    pub fn config(&self) -> &HttpFetcherConfig {
        &self.config
    }

    /// Fetch and decode, surfacing the failure reason
    pub async fn try_fetch(&self, url: &str) -> Result<Value, FetchError> {
        let mut req = self.http.get(url).header("Accept", "application/json");

        if let Some(ref api_key) = self.config.api_key {
            req = req.header(self.config.api_key_header.as_str(), api_key);
        }

        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                url: url.to_string(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| FetchError::ParseError(format!("Failed to parse JSON: {}", e)))
    }
}

#[async_trait]
impl JsonFetcher for HttpFetcher {
    async fn fetch_json(&self, url: &str) -> Option<Value> {
        match self.try_fetch(url).await {
            Ok(body) => {
                debug!("Fetched {}", url);
                Some(body)
            }
            Err(e) => {
                warn!("Fetch failed: {} ({})", e, url);
                None
            }
        }
    }
}
