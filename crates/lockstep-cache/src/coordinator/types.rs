use crate::storage::CacheEntry;

/// Header name carrying the [`CacheStatus`] on `/generate` responses.
pub const CACHE_STATUS_HEADER: &str = "X-Lockstep-Cache";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// How a request was served.
pub enum CacheStatus {
    /// From the store, or by joining an in-flight generation.
    Hit,
    /// This request triggered the upstream call.
    Miss,
}

impl CacheStatus {
    pub fn as_header_value(&self) -> &'static str {
        match self {
            Self::Hit => "HIT",
            Self::Miss => "MISS",
        }
    }
}

/// Outcome of resolving one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub entry: CacheEntry,
    pub cache_hit: bool,
}

impl Resolution {
    pub fn status(&self) -> CacheStatus {
        if self.cache_hit {
            CacheStatus::Hit
        } else {
            CacheStatus::Miss
        }
    }
}
