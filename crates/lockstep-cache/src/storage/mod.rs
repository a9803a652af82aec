//! Cache persistence.
//!
//! - [`CacheEntry`] is the persisted record.
//! - [`CacheStore`] is the capability the coordinator and sweeper are written
//!   against: get, put, delete, list, and delete-by-predicate.
//! - [`MemoryStore`] and [`FileStore`] are the shipped implementations.

/// Storage error types.
pub mod error;
/// File-per-entry store.
pub mod file;
/// In-process store.
pub mod memory;
mod model;

#[cfg(test)]
mod tests;

pub use error::{StoreError, StoreResult};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use model::{ArchivedCacheEntry, CacheEntry};

use async_trait::async_trait;
use tracing::warn;

/// Current wall-clock time in Unix milliseconds, the unit of every entry timestamp.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Predicate used by [`CacheStore::delete_where`].
pub type EntryPredicate<'a> = &'a (dyn Fn(&CacheEntry) -> bool + Send + Sync);

/// Key/value persistence for cache entries, keyed by hex fingerprint.
///
/// Implementations must give read-after-write consistency per key: a `put`
/// that returned `Ok` is visible to every later `get` of the same key.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Loads the entry stored under `key`.
    async fn get(&self, key: &str) -> StoreResult<Option<CacheEntry>>;

    /// Writes `entry` under `key`, replacing any previous value.
    async fn put(&self, key: &str, entry: &CacheEntry) -> StoreResult<()>;

    /// Removes `key`. Returns `true` if something was deleted.
    async fn delete(&self, key: &str) -> StoreResult<bool>;

    /// Lists every stored key.
    async fn list_keys(&self) -> StoreResult<Vec<String>>;

    /// Removes every entry matching `predicate` and returns how many were removed.
    ///
    /// The default implementation lists, loads and deletes one key at a time.
    /// Entries that disappear mid-scan are skipped. Undecodable entries are
    /// dropped without being counted; the next request for that key
    /// regenerates it.
    async fn delete_where(&self, predicate: EntryPredicate<'_>) -> StoreResult<usize> {
        let mut removed = 0;
        for key in self.list_keys().await? {
            let entry = match self.get(&key).await {
                Ok(Some(entry)) => entry,
                Ok(None) => continue,
                Err(StoreError::Corrupt { key, reason }) => {
                    warn!(key = %key, reason = %reason, "Dropping corrupt entry during scan");
                    self.delete(&key).await?;
                    continue;
                }
                Err(e) => return Err(e),
            };
            if predicate(&entry) && self.delete(&key).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
