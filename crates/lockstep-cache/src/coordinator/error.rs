use thiserror::Error;

use crate::storage::StoreError;
use crate::upstream::UpstreamError;

/// Why a fingerprint could not be resolved.
///
/// `Clone` because one outcome is fanned out to every caller attached to the
/// same generation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The coordinator task went away before answering.
    #[error("coordinator unavailable")]
    Unavailable,
}

impl CoordinatorError {
    /// Stable code reported to callers.
    pub fn code(&self) -> &'static str {
        match self {
            CoordinatorError::Upstream(e) => e.code(),
            CoordinatorError::Store(_) => "STORE_ERROR",
            CoordinatorError::Unavailable => "INTERNAL_ERROR",
        }
    }
}
