use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use super::{CoordinatorError, Resolution, Shared};
use crate::hashing::Fingerprint;
use crate::request::GenerationRequest;
use crate::storage::{CacheEntry, StoreError, now_millis};
use crate::upstream::{Generation, UpstreamCall, UpstreamError};

pub(crate) type Reply = oneshot::Sender<Result<Resolution, CoordinatorError>>;

pub(crate) enum Command {
    Resolve {
        request: GenerationRequest,
        reply: Reply,
    },
    /// Sent by the generation task when the upstream call finishes.
    Completed(Result<Generation, UpstreamError>),
}

/// Callers waiting on the one in-flight upstream call.
struct PendingGeneration {
    request: GenerationRequest,
    initiator: Reply,
    joiners: Vec<Reply>,
}

impl PendingGeneration {
    /// Delivers the outcome once: `cache_hit = false` to the initiator, `true` to joiners.
    fn resolve(self, outcome: Result<CacheEntry, CoordinatorError>) {
        for joiner in self.joiners {
            let _ = joiner.send(outcome.clone().map(|entry| Resolution {
                entry,
                cache_hit: true,
            }));
        }
        let _ = self.initiator.send(outcome.map(|entry| Resolution {
            entry,
            cache_hit: false,
        }));
    }
}

/// Sole owner of one fingerprint's entry and pending generation.
///
/// Commands are handled strictly one at a time, which makes
/// "check store, check pending, register pending" a single decision.
pub(crate) struct FingerprintActor {
    fingerprint: Fingerprint,
    shared: Arc<Shared>,
    inbox: mpsc::UnboundedReceiver<Command>,
    outbox: mpsc::UnboundedSender<Command>,
    pending: Option<PendingGeneration>,
}

impl FingerprintActor {
    pub(crate) fn new(
        fingerprint: Fingerprint,
        shared: Arc<Shared>,
        inbox: mpsc::UnboundedReceiver<Command>,
        outbox: mpsc::UnboundedSender<Command>,
    ) -> Self {
        Self {
            fingerprint,
            shared,
            inbox,
            outbox,
            pending: None,
        }
    }

    pub(crate) async fn run(mut self) {
        debug!(fingerprint = %self.fingerprint, "Coordinator started");
        loop {
            let command = if self.pending.is_some() {
                match self.inbox.recv().await {
                    Some(command) => command,
                    None => break,
                }
            } else {
                match self.next_or_retire() {
                    Some(command) => command,
                    None => break,
                }
            };

            match command {
                Command::Resolve { request, reply } => self.resolve(request, reply).await,
                Command::Completed(result) => self.complete(result).await,
            }
        }
    }

    /// Takes the next queued command, or removes this actor from the registry.
    ///
    /// Senders only enqueue while holding the registry lock, so an empty inbox
    /// observed under that lock stays empty until the entry is gone.
    fn next_or_retire(&mut self) -> Option<Command> {
        if let Ok(command) = self.inbox.try_recv() {
            return Some(command);
        }

        let mut actors = self.shared.actors.lock();
        if let Ok(command) = self.inbox.try_recv() {
            return Some(command);
        }
        if actors
            .get(&self.fingerprint)
            .is_some_and(|tx| tx.same_channel(&self.outbox))
        {
            actors.remove(&self.fingerprint);
        }
        debug!(fingerprint = %self.fingerprint, "Coordinator retired");
        None
    }

    async fn resolve(&mut self, request: GenerationRequest, reply: Reply) {
        let stored = self.shared.store.get(self.fingerprint.as_str()).await;
        match stored {
            Ok(Some(entry)) => {
                let result = self.serve_hit(entry).await;
                let _ = reply.send(result);
                return;
            }
            Ok(None) => {}
            // Unreadable entries are regenerated; the new put overwrites them.
            Err(StoreError::Corrupt { reason, .. }) => {
                warn!(
                    fingerprint = %self.fingerprint,
                    reason = %reason,
                    "Corrupt entry, treating as absent"
                );
            }
            Err(e) => {
                self.shared.stats.record_store_failure();
                error!(fingerprint = %self.fingerprint, error = %e, "Store read failed");
                let _ = reply.send(Err(e.into()));
                return;
            }
        }

        if let Some(pending) = self.pending.as_mut() {
            self.shared.stats.record_join();
            debug!(fingerprint = %self.fingerprint, "Joining in-flight generation");
            pending.joiners.push(reply);
            return;
        }

        self.start_generation(request, reply);
    }

    async fn serve_hit(&self, entry: CacheEntry) -> Result<Resolution, CoordinatorError> {
        let touched = entry.touched(now_millis());
        if let Err(e) = self
            .shared
            .store
            .put(self.fingerprint.as_str(), &touched)
            .await
        {
            self.shared.stats.record_store_failure();
            error!(fingerprint = %self.fingerprint, error = %e, "Store write failed on hit");
            return Err(e.into());
        }

        self.shared.stats.record_hit();
        debug!(
            fingerprint = %self.fingerprint,
            hit_count = touched.hit_count,
            "Cache hit"
        );
        Ok(Resolution {
            entry: touched,
            cache_hit: true,
        })
    }

    fn start_generation(&mut self, request: GenerationRequest, reply: Reply) {
        self.shared.stats.record_generation();
        let call = UpstreamCall::from_request(&request);
        info!(
            fingerprint = %self.fingerprint,
            model = %call.model,
            seed = call.seed,
            "Cache miss, calling upstream"
        );

        let upstream = Arc::clone(&self.shared.upstream);
        let outbox = self.outbox.clone();
        // Detached from the caller: a dropped request must not cancel the generation.
        tokio::spawn(async move {
            let result = match tokio::spawn(async move { upstream.generate(&call).await }).await
            {
                Ok(result) => result,
                Err(e) => Err(UpstreamError::Transport(format!(
                    "generation task failed: {}",
                    e
                ))),
            };
            let _ = outbox.send(Command::Completed(result));
        });

        self.pending = Some(PendingGeneration {
            request,
            initiator: reply,
            joiners: Vec::new(),
        });
    }

    async fn complete(&mut self, result: Result<Generation, UpstreamError>) {
        let Some(pending) = self.pending.take() else {
            warn!(fingerprint = %self.fingerprint, "Completion without a pending generation");
            return;
        };

        let outcome = match result {
            Ok(generation) => self.persist(&pending.request, generation).await,
            Err(e) => {
                self.shared.stats.record_upstream_failure();
                warn!(
                    fingerprint = %self.fingerprint,
                    waiters = pending.joiners.len() + 1,
                    error = %e,
                    "Upstream generation failed"
                );
                Err(e.into())
            }
        };

        pending.resolve(outcome);
    }

    async fn persist(
        &self,
        request: &GenerationRequest,
        generation: Generation,
    ) -> Result<CacheEntry, CoordinatorError> {
        if generation.is_truncated() {
            warn!(
                fingerprint = %self.fingerprint,
                max_tokens = request.max_tokens(),
                "Upstream output truncated at the token limit; caching as-is"
            );
        }

        let entry = CacheEntry::new(
            self.fingerprint.as_str(),
            generation.content,
            request.model.as_str(),
            request.seed,
            now_millis(),
        )
        .with_finish_reason(generation.finish_reason);

        match self
            .shared
            .store
            .put(self.fingerprint.as_str(), &entry)
            .await
        {
            Ok(()) => {
                info!(fingerprint = %self.fingerprint, "Generation cached");
                Ok(entry)
            }
            Err(e) => {
                self.shared.stats.record_store_failure();
                error!(fingerprint = %self.fingerprint, error = %e, "Store write failed");
                Err(e.into())
            }
        }
    }
}
