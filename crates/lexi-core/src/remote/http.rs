//! HTTP implementation of [`WordRepository`]

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use super::wire::{parse_fetch_response, parse_write_response};
use super::{RemoteError, WordRepository};
use crate::config::Config;
use crate::models::{PendingOperation, WordEntry};

// Plain text keeps the POST a "simple" request for script endpoints
const WRITE_CONTENT_TYPE: &str = "text/plain;charset=utf-8";

/// Remote word repository over HTTP
///
/// Without an endpoint every call fails with [`RemoteError::NotConfigured`],
/// which leaves the engine running local-only.
#[derive(Debug, Clone)]
pub struct HttpRepository {
    client: reqwest::Client,
    endpoint: Option<String>,
}

impl HttpRepository {
    /// Create a client for `endpoint` with a per-request timeout
    pub fn new(endpoint: Option<String>, timeout: Duration) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("lexi/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(RemoteError::from_reqwest)?;

        Ok(Self { client, endpoint })
    }

    /// Create a client from the active endpoint and timeout in `config`
    pub fn from_config(config: &Config) -> Result<Self, RemoteError> {
        Self::new(
            config.active_endpoint().map(String::from),
            config.request_timeout(),
        )
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    fn require_endpoint(&self) -> Result<&str, RemoteError> {
        self.endpoint().ok_or(RemoteError::NotConfigured)
    }
}

impl WordRepository for HttpRepository {
    async fn fetch_words(&self) -> Result<Vec<WordEntry>, RemoteError> {
        let url = self.require_endpoint()?;
        debug!("Fetching word list from {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(RemoteError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(RemoteError::from_reqwest)?;
        parse_fetch_response(&body)
    }

    async fn send(&self, op: PendingOperation) -> Result<(), RemoteError> {
        let url = self.require_endpoint()?;
        let body = serde_json::to_string(&op).map_err(|e| RemoteError::Encode(e.to_string()))?;
        debug!("Sending {} for '{}'", op.action(), op.word());

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, WRITE_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(RemoteError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RemoteError::Status(status.as_u16()));
        }

        let body = response.text().await.map_err(RemoteError::from_reqwest)?;
        parse_write_response(&body)
    }
}
