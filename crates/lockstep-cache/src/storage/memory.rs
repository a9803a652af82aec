//! In-process store backed by a `HashMap`.
//!
//! Used when no storage directory is configured and as the fake store in tests.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{CacheEntry, CacheStore, EntryPredicate, StoreResult};

#[derive(Debug, Clone, Default)]
/// Shared in-memory store. Clones share the same map.
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<CacheEntry>> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn put(&self, key: &str, entry: &CacheEntry) -> StoreResult<()> {
        self.entries.write().insert(key.to_string(), entry.clone());
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        Ok(self.entries.write().remove(key).is_some())
    }

    async fn list_keys(&self) -> StoreResult<Vec<String>> {
        Ok(self.entries.read().keys().cloned().collect())
    }

    async fn delete_where(&self, predicate: EntryPredicate<'_>) -> StoreResult<usize> {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| !predicate(entry));
        Ok(before - entries.len())
    }
}
