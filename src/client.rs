//! HTTP client for the transaction status API

use crate::config::WidgetConfig;
use crate::types::TransactionStatus;
use crate::{PayButtonError, Result};
use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Characters escaped in the reference path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Source of transaction status snapshots
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Fetch the current status of the transaction with the given reference
    async fn fetch_status(&self, reference: &str, embed_token: &str) -> Result<TransactionStatus>;
}

/// Client for `GET {status}/transaction/ref/{ref}`
#[derive(Debug, Clone)]
pub struct StatusClient {
    /// Base URL of the status API
    url: String,
    /// HTTP client
    client: Client,
}

impl StatusClient {
    /// Create a status client for the given base URL
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(url, Duration::from_secs(30))
    }

    /// Create a status client with a request timeout
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PayButtonError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Create a status client from the widget configuration
    pub fn from_config(config: &WidgetConfig) -> Result<Self> {
        Self::with_timeout(&config.status_url, config.request_timeout())
    }

    /// URL polled for a reference
    pub fn status_url(&self, reference: &str) -> String {
        format!(
            "{}/transaction/ref/{}",
            self.url,
            utf8_percent_encode(reference, PATH_SEGMENT)
        )
    }

    /// Get the base URL of the status API
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl StatusSource for StatusClient {
    async fn fetch_status(&self, reference: &str, embed_token: &str) -> Result<TransactionStatus> {
        let url = self.status_url(reference);
        debug!("Fetching transaction status from {}", url);

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", embed_token))
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(PayButtonError::StatusRequest {
                status: response.status().as_u16(),
            });
        }

        let status: TransactionStatus = response.json().await?;
        Ok(status)
    }
}
