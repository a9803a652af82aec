//! Storage model types.

use rkyv::{Archive, Deserialize, Serialize};

/// Cached generation persisted per fingerprint.
///
/// Stored as `rkyv` bytes by [`crate::storage::FileStore`]. `content` is
/// written once and never changes; `last_accessed_at` and `hit_count` are
/// bumped on every store hit.
///
/// # Example
/// ```rust
/// use lockstep::CacheEntry;
///
/// let entry = CacheEntry::new("a".repeat(64), "hello", "m", 7, 1_700_000_000_000);
/// assert_eq!(entry.hit_count, 0);
/// assert_eq!(entry.cached_at, entry.last_accessed_at);
/// ```
#[derive(
    Archive, Deserialize, Serialize, serde::Serialize, serde::Deserialize, Debug, PartialEq, Eq, Clone,
)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// Generated text.
    pub content: String,
    /// Model that produced `content`.
    pub model: String,
    /// Seed the upstream was called with.
    pub seed: i64,
    /// Hex fingerprint this entry is stored under.
    pub fingerprint: String,
    /// Creation time, Unix milliseconds (UTC).
    pub cached_at: i64,
    /// Last store hit, Unix milliseconds (UTC).
    pub last_accessed_at: i64,
    /// Number of store hits since creation.
    pub hit_count: u64,
    /// Upstream finish reason (`stop`, `length`, ...), if reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

impl CacheEntry {
    /// Creates a fresh entry with `cached_at = last_accessed_at = now_ms`.
    pub fn new(
        fingerprint: impl Into<String>,
        content: impl Into<String>,
        model: impl Into<String>,
        seed: i64,
        now_ms: i64,
    ) -> Self {
        Self {
            content: content.into(),
            model: model.into(),
            seed,
            fingerprint: fingerprint.into(),
            cached_at: now_ms,
            last_accessed_at: now_ms,
            hit_count: 0,
            finish_reason: None,
        }
    }

    pub fn with_finish_reason(mut self, finish_reason: Option<String>) -> Self {
        self.finish_reason = finish_reason;
        self
    }

    /// Returns a copy with the access metadata bumped.
    pub fn touched(&self, now_ms: i64) -> Self {
        Self {
            last_accessed_at: now_ms.max(self.last_accessed_at),
            hit_count: self.hit_count.saturating_add(1),
            ..self.clone()
        }
    }

    /// Returns `true` if the entry was created before `cutoff_ms`.
    #[inline]
    pub fn is_older_than(&self, cutoff_ms: i64) -> bool {
        self.cached_at < cutoff_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rkyv::rancor::Error;
    use rkyv::{access, from_bytes, to_bytes};

    fn create_test_entry() -> CacheEntry {
        CacheEntry::new("f".repeat(64), "generated text", "m", 12345, 1_702_500_000_000)
            .with_finish_reason(Some("stop".to_string()))
    }

    #[test]
    fn test_rkyv_round_trip() {
        let entry = create_test_entry();
        let bytes = to_bytes::<Error>(&entry).unwrap();
        let restored = from_bytes::<CacheEntry, Error>(&bytes).unwrap();
        assert_eq!(restored, entry);
    }

    #[test]
    fn test_archived_access_without_copy() {
        let entry = create_test_entry();
        let bytes = to_bytes::<Error>(&entry).unwrap();
        let archived = access::<ArchivedCacheEntry, Error>(&bytes).unwrap();
        assert_eq!(archived.content.as_str(), "generated text");
        assert_eq!(archived.seed, 12345);
    }

    #[test]
    fn test_touched_bumps_metadata_only() {
        let entry = create_test_entry();
        let touched = entry.touched(1_702_500_005_000);
        assert_eq!(touched.hit_count, 1);
        assert_eq!(touched.last_accessed_at, 1_702_500_005_000);
        assert_eq!(touched.cached_at, entry.cached_at);
        assert_eq!(touched.content, entry.content);
    }

    #[test]
    fn test_touched_never_moves_access_time_backwards() {
        let entry = create_test_entry();
        let touched = entry.touched(entry.last_accessed_at - 10);
        assert_eq!(touched.last_accessed_at, entry.last_accessed_at);
    }

    #[test]
    fn test_json_field_names() {
        let value = serde_json::to_value(create_test_entry()).unwrap();
        assert!(value.get("cachedAt").is_some());
        assert!(value.get("lastAccessedAt").is_some());
        assert!(value.get("hitCount").is_some());
    }
}
