use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Process-wide coordinator counters.
#[derive(Debug, Default)]
pub struct CoordinatorStats {
    hits: AtomicU64,
    joins: AtomicU64,
    generations: AtomicU64,
    upstream_failures: AtomicU64,
    store_failures: AtomicU64,
}

impl CoordinatorStats {
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_join(&self) {
        self.joins.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_generation(&self) {
        self.generations.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_upstream_failure(&self) {
        self.upstream_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_store_failure(&self) {
        self.store_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, active_coordinators: usize) -> StatsSnapshot {
        StatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            joins: self.joins.load(Ordering::Relaxed),
            generations: self.generations.load(Ordering::Relaxed),
            upstream_failures: self.upstream_failures.load(Ordering::Relaxed),
            store_failures: self.store_failures.load(Ordering::Relaxed),
            active_coordinators,
        }
    }
}

/// Point-in-time copy of [`CoordinatorStats`], as served by `/stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    /// Requests answered from the store.
    pub hits: u64,
    /// Requests that attached to an in-flight generation.
    pub joins: u64,
    /// Upstream calls started.
    pub generations: u64,
    pub upstream_failures: u64,
    pub store_failures: u64,
    /// Fingerprints with a live coordinator task.
    pub active_coordinators: usize,
}
