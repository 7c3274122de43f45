//! Error types surfaced to callers of the engine
//!
//! Remote failures are absorbed by the engine (queued and reported as
//! events), so they never appear here.

use thiserror::Error;

use crate::storage::StorageError;

/// A mutation was refused before touching any state
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a word")]
    EmptyWord,

    #[error("\"{0}\" already exists")]
    Duplicate(String),

    #[error("\"{0}\" was not found")]
    UnknownWord(String),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl Error {
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            Error::Validation(e) => Some(e),
            Error::Storage(_) => None,
        }
    }

    /// Recovery suggestion for storage failures
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            Error::Validation(_) => None,
            Error::Storage(e) => e.recovery_suggestion(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
