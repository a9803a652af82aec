use thiserror::Error;

/// Failures reported by an [`crate::upstream::UpstreamClient`].
///
/// `Clone` because a single failure is delivered to the initiator and every
/// caller that joined the same generation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    /// Upstream answered with a non-success status. `body` is truncated.
    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("upstream request failed: {0}")]
    Transport(String),

    #[error("upstream response could not be parsed: {0}")]
    InvalidResponse(String),

    /// Well-formed response without usable content (no choices, null or blank text).
    #[error("upstream returned an empty response")]
    EmptyResponse,
}

impl UpstreamError {
    /// Stable code reported to callers.
    pub fn code(&self) -> &'static str {
        match self {
            UpstreamError::EmptyResponse => "EMPTY_RESPONSE",
            _ => "UPSTREAM_ERROR",
        }
    }
}
