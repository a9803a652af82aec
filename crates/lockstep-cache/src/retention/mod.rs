//! Age-based eviction of cache entries.
//!
//! The sweeper never talks to coordinators: it only uses the store's
//! predicate delete, so it is safe to run while requests are being served.
//! A concurrent hit may re-write an entry the sweeper just removed; that entry
//! is simply swept on a later run.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time;
use tracing::{debug, info, warn};

use crate::constants::{DEFAULT_RETENTION_DAYS, MILLIS_PER_DAY};
use crate::storage::{CacheEntry, CacheStore, StoreResult, now_millis};

/// Result of one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub deleted_count: usize,
    /// Entries with `cached_at` before this instant (Unix ms) were eligible.
    pub cutoff_ms: i64,
}

/// Deletes entries older than the retention horizon.
#[derive(Clone)]
pub struct RetentionSweeper {
    store: Arc<dyn CacheStore>,
    retention_days: u64,
    running: Arc<AtomicBool>,
}

impl RetentionSweeper {
    pub fn new(store: Arc<dyn CacheStore>, retention_days: u64) -> Self {
        Self {
            store,
            retention_days,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_default_retention(store: Arc<dyn CacheStore>) -> Self {
        Self::new(store, DEFAULT_RETENTION_DAYS)
    }

    pub fn retention_days(&self) -> u64 {
        self.retention_days
    }

    /// Sweeps with the configured horizon.
    pub async fn sweep(&self) -> StoreResult<SweepReport> {
        self.sweep_at(now_millis()).await
    }

    /// Sweeps with an explicit horizon in days.
    pub async fn sweep_with_horizon(&self, retention_days: u64) -> StoreResult<SweepReport> {
        sweep_store(self.store.as_ref(), retention_days, now_millis()).await
    }

    /// Sweeps as if the current time were `now_ms`.
    pub async fn sweep_at(&self, now_ms: i64) -> StoreResult<SweepReport> {
        sweep_store(self.store.as_ref(), self.retention_days, now_ms).await
    }

    /// Starts the periodic sweep task (no-op if already running).
    ///
    /// The first sweep runs one full `interval` after start.
    pub fn start(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        if self.running.swap(true, Ordering::AcqRel) {
            return tokio::spawn(async {});
        }

        let sweeper = self.clone();
        tokio::spawn(async move {
            let mut ticker = time::interval_at(time::Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match sweeper.sweep().await {
                    Ok(report) => debug!(deleted = report.deleted_count, "Scheduled sweep finished"),
                    Err(e) => warn!(error = %e, "Scheduled sweep failed"),
                }
            }
        })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for RetentionSweeper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetentionSweeper")
            .field("retention_days", &self.retention_days)
            .field("running", &self.is_running())
            .finish()
    }
}

/// Cutoff instant for `retention_days` before `now_ms`.
pub fn retention_cutoff(now_ms: i64, retention_days: u64) -> i64 {
    let horizon = i64::try_from(retention_days)
        .unwrap_or(i64::MAX)
        .saturating_mul(MILLIS_PER_DAY);
    now_ms.saturating_sub(horizon)
}

async fn sweep_store(
    store: &dyn CacheStore,
    retention_days: u64,
    now_ms: i64,
) -> StoreResult<SweepReport> {
    let cutoff_ms = retention_cutoff(now_ms, retention_days);
    let deleted_count = store
        .delete_where(&|entry: &CacheEntry| entry.is_older_than(cutoff_ms))
        .await?;

    info!(deleted = deleted_count, retention_days, cutoff_ms, "Retention sweep complete");
    Ok(SweepReport {
        deleted_count,
        cutoff_ms,
    })
}
