//! Single-flight resolution of fingerprints.
//!
//! Each active fingerprint is owned by one coordinator task. The
//! [`CoordinatorRegistry`] routes requests to that task (spawning it on
//! demand); the task answers store hits, attaches callers to an in-flight
//! generation, or starts the one upstream call for the fingerprint.
//!
//! ```text
//! resolve(fp) -> registry -> [fp actor] -> store.get
//!                                 |-- hit      -> touch + reply(cache_hit = true)
//!                                 |-- pending  -> join waiters
//!                                 `-- absent   -> spawn upstream call
//!                                                 `-> Completed -> persist -> reply all
//! ```

mod actor;
/// Coordinator error types.
pub mod error;
/// Counters served by `/stats`.
pub mod stats;
/// Resolution results.
pub mod types;


pub use error::CoordinatorError;
pub use stats::{CoordinatorStats, StatsSnapshot};
pub use types::{CACHE_STATUS_HEADER, CacheStatus, Resolution};

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};

use crate::hashing::Fingerprint;
use crate::request::GenerationRequest;
use crate::storage::CacheStore;
use crate::upstream::UpstreamClient;
use actor::{Command, FingerprintActor};

pub(crate) struct Shared {
    pub(crate) store: Arc<dyn CacheStore>,
    pub(crate) upstream: Arc<dyn UpstreamClient>,
    pub(crate) actors: Mutex<HashMap<Fingerprint, mpsc::UnboundedSender<Command>>>,
    pub(crate) stats: CoordinatorStats,
}

/// Routes each fingerprint to its coordinator task.
///
/// Cheap to clone; clones share the same table. Must be used from within a
/// Tokio runtime.
#[derive(Clone)]
pub struct CoordinatorRegistry {
    shared: Arc<Shared>,
}

impl CoordinatorRegistry {
    pub fn new(store: Arc<dyn CacheStore>, upstream: Arc<dyn UpstreamClient>) -> Self {
        Self {
            shared: Arc::new(Shared {
                store,
                upstream,
                actors: Mutex::new(HashMap::new()),
                stats: CoordinatorStats::default(),
            }),
        }
    }

    /// Returns the entry for `fingerprint`, generating it at most once.
    ///
    /// `request` must be the request `fingerprint` was derived from; it is only
    /// used if this call ends up starting the upstream generation.
    pub async fn resolve(
        &self,
        fingerprint: &Fingerprint,
        request: &GenerationRequest,
    ) -> Result<Resolution, CoordinatorError> {
        let (reply, response) = oneshot::channel();
        self.dispatch(
            fingerprint,
            Command::Resolve {
                request: request.clone(),
                reply,
            },
        );
        response.await.map_err(|_| CoordinatorError::Unavailable)?
    }

    fn dispatch(&self, fingerprint: &Fingerprint, command: Command) {
        let mut actors = self.shared.actors.lock();

        let command = match actors.get(fingerprint) {
            Some(tx) => match tx.send(command) {
                Ok(()) => return,
                // Task ended without retiring (runtime shutdown); replace it.
                Err(mpsc::error::SendError(command)) => command,
            },
            None => command,
        };

        let (tx, rx) = mpsc::unbounded_channel();
        // A fresh receiver is alive, so this cannot fail.
        let _ = tx.send(command);
        actors.insert(fingerprint.clone(), tx.clone());

        let actor = FingerprintActor::new(fingerprint.clone(), Arc::clone(&self.shared), rx, tx);
        tokio::spawn(actor.run());
    }

    /// Number of fingerprints that currently have a live coordinator.
    pub fn active_coordinators(&self) -> usize {
        self.shared.actors.lock().len()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.shared.stats.snapshot(self.active_coordinators())
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.shared.store
    }
}

impl std::fmt::Debug for CoordinatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoordinatorRegistry")
            .field("active_coordinators", &self.active_coordinators())
            .finish()
    }
}
