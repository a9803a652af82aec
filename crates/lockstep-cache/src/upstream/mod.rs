//! Upstream generation API.
//!
//! [`UpstreamClient`] is the seam the coordinator calls through. The gateway
//! ships [`HttpUpstream`] (OpenAI-compatible chat completions) and
//! [`MockUpstream`] (deterministic canned text for local runs).

pub mod error;
pub mod http;
pub mod mock;
#[cfg(any(test, feature = "mock"))]
pub mod testing;

pub use error::UpstreamError;
pub use http::HttpUpstream;
pub use mock::MockUpstream;
#[cfg(any(test, feature = "mock"))]
pub use testing::CountingUpstream;

use async_trait::async_trait;

use crate::request::GenerationRequest;

/// Parameters of one upstream call, with defaults applied.
///
/// Temperature is always `0.0` and `seed` is the caller's seed verbatim; the
/// gateway never invents either.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamCall {
    pub model: String,
    pub prompt: String,
    pub system_prompt: String,
    pub max_tokens: u32,
    pub seed: i64,
    pub temperature: f64,
}

impl UpstreamCall {
    pub fn from_request(request: &GenerationRequest) -> Self {
        Self {
            model: request.model.clone(),
            prompt: request.prompt.clone(),
            system_prompt: request.system_prompt().to_string(),
            max_tokens: request.max_tokens(),
            seed: request.seed,
            temperature: 0.0,
        }
    }
}

/// Successful upstream output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub content: String,
    /// `stop`, `length`, ... when the upstream reports it.
    pub finish_reason: Option<String>,
}

impl Generation {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            finish_reason: None,
        }
    }

    /// Returns `true` if the upstream stopped on the token limit.
    pub fn is_truncated(&self) -> bool {
        self.finish_reason.as_deref() == Some("length")
    }
}

#[async_trait]
/// Client for the generation API.
pub trait UpstreamClient: Send + Sync {
    /// Performs one generation. Implementations must not retry internally.
    async fn generate(&self, call: &UpstreamCall) -> Result<Generation, UpstreamError>;
}
