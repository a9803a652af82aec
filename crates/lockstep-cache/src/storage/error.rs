use std::path::PathBuf;

use thiserror::Error;

/// Persistence failures. Messages are kept as strings so the error can be
/// cloned and handed to every caller waiting on the same fingerprint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("storage directory unavailable: {path}")]
    Unavailable { path: PathBuf },

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("corrupt entry for {key}: {reason}")]
    Corrupt { key: String, reason: String },

    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    #[error("storage task failed: {0}")]
    Task(String),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
