//! Instrumented upstream for concurrency tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use super::{Generation, UpstreamCall, UpstreamClient, UpstreamError};

/// Counts calls and can be slowed down, gated, or made to fail.
///
/// Content is `"generation #{n} for {prompt} (seed {seed})"` where `n` is the
/// 1-based call number, so tests can tell which call produced an entry.
#[derive(Debug, Clone, Default)]
pub struct CountingUpstream {
    calls: Arc<AtomicU64>,
    delay: Option<Duration>,
    gate: Option<Arc<Semaphore>>,
    fail_first: u64,
    failure: Option<UpstreamError>,
}

impl CountingUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleeps for `delay` inside every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Blocks every call until a permit is added to `gate`.
    pub fn with_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Fails the first `n` calls with `error`.
    pub fn failing_first(mut self, n: u64, error: UpstreamError) -> Self {
        self.fail_first = n;
        self.failure = Some(error);
        self
    }

    /// Fails every call with `error`.
    pub fn always_failing(self, error: UpstreamError) -> Self {
        self.failing_first(u64::MAX, error)
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UpstreamClient for CountingUpstream {
    async fn generate(&self, call: &UpstreamCall) -> Result<Generation, UpstreamError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(gate) = &self.gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|e| UpstreamError::Transport(e.to_string()))?;
            permit.forget();
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if n <= self.fail_first
            && let Some(err) = &self.failure
        {
            return Err(err.clone());
        }

        Ok(Generation {
            content: format!("generation #{} for {} (seed {})", n, call.prompt, call.seed),
            finish_reason: Some("stop".to_string()),
        })
    }
}
