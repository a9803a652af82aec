use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use super::{Generation, UpstreamCall, UpstreamClient, UpstreamError};

/// Deterministic upstream for local runs (`LOCKSTEP_MOCK_PROVIDER=true`).
///
/// The output depends only on the call parameters, so repeated calls with the
/// same request produce the same text.
#[derive(Debug, Clone, Default)]
pub struct MockUpstream {
    calls: Arc<AtomicU64>,
}

impl MockUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of generations served so far (shared across clones).
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }

    pub fn render(call: &UpstreamCall) -> String {
        format!("Mock response for: {} (seed {})", call.prompt, call.seed)
    }
}

#[async_trait]
impl UpstreamClient for MockUpstream {
    async fn generate(&self, call: &UpstreamCall) -> Result<Generation, UpstreamError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(Generation {
            content: Self::render(call),
            finish_reason: Some("stop".to_string()),
        })
    }
}
