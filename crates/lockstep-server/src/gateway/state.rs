use std::sync::Arc;

use lockstep::{CacheStore, CoordinatorRegistry, RetentionSweeper, Signer, UpstreamClient};

/// Shared handler state (cheap to clone).
#[derive(Clone)]
pub struct HandlerState {
    pub registry: CoordinatorRegistry,

    pub signer: Arc<Signer>,

    pub sweeper: RetentionSweeper,

    pub service_name: Arc<str>,
}

impl HandlerState {
    pub fn new(
        store: Arc<dyn CacheStore>,
        upstream: Arc<dyn UpstreamClient>,
        signer: Signer,
        retention_days: u64,
        service_name: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            registry: CoordinatorRegistry::new(Arc::clone(&store), upstream),
            signer: Arc::new(signer),
            sweeper: RetentionSweeper::new(store, retention_days),
            service_name: service_name.into(),
        }
    }
}
