//! Remote word repository
//!
//! The spreadsheet-backed endpoint that holds the shared word list.
//!
//! ## Contract
//!
//! - `GET <endpoint>` returns `{"result":"success","words":[...]}`
//! - `POST <endpoint>` with a [`PendingOperation`] JSON body returns
//!   `{"result":"success"}`
//!
//! Anything else (another shape, a non-2xx status, a network error, a
//! timeout) is a failure. Calls are stateless.

mod http;
mod wire;

#[cfg(test)]
pub(crate) mod fake;

use std::future::Future;

use thiserror::Error;

use crate::models::{PendingOperation, WordEntry};

pub use http::HttpRepository;
pub use wire::{parse_fetch_response, parse_write_response};

/// Reasons a remote call did not succeed
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// No endpoint configured, or sync disabled
    #[error("no remote endpoint configured")]
    NotConfigured,

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    /// Non-2xx HTTP status
    #[error("remote returned HTTP {0}")]
    Status(u16),

    /// Well-formed response without `"result": "success"`
    #[error("remote rejected the request: {}", .0.as_deref().unwrap_or("no message"))]
    Rejected(Option<String>),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The request body could not be built
    #[error("failed to encode request: {0}")]
    Encode(String),
}

impl RemoteError {
    pub(crate) fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            RemoteError::Timeout
        } else if error.is_decode() {
            RemoteError::InvalidResponse(error.to_string())
        } else if let Some(status) = error.status() {
            RemoteError::Status(status.as_u16())
        } else {
            RemoteError::Network(error.to_string())
        }
    }

    /// Whether the remote could not be reached at all
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            RemoteError::NotConfigured | RemoteError::Timeout | RemoteError::Network(_)
        )
    }
}

/// Read and write access to the remote word list
pub trait WordRepository {
    /// Fetch the full word list
    fn fetch_words(&self) -> impl Future<Output = Result<Vec<WordEntry>, RemoteError>> + Send;

    /// Deliver one mutation
    fn send(&self, op: PendingOperation) -> impl Future<Output = Result<(), RemoteError>> + Send;
}
