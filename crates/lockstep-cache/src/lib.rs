//! Lockstep library crate (used by the server and integration tests).
//!
//! Serves deterministic LLM generations: a request is reduced to a
//! [`Fingerprint`], the first caller for a fingerprint triggers exactly one
//! upstream call, and every later or concurrent caller gets the same stored
//! text, signed by [`Signer`].
//!
//! # Public API Surface
//!
//! ## Request path
//! - [`GenerationRequest`], [`validate_request`], [`ValidationError`] - Front-door validation
//! - [`Fingerprint`], [`derive_fingerprint`] - Request identity
//! - [`CoordinatorRegistry`], [`Resolution`] - Single-flight resolution
//! - [`Signer`], [`SignedResponse`] - Response signing
//!
//! ## Persistence
//! - [`CacheStore`], [`MemoryStore`], [`FileStore`], [`CacheEntry`]
//! - [`RetentionSweeper`] - Age-based eviction
//!
//! ## Upstream
//! - [`UpstreamClient`], [`HttpUpstream`], [`MockUpstream`]
//!
//! ## Test/Mock Support
//! [`CountingUpstream`] is available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod config;
pub mod constants;
pub mod coordinator;
pub mod hashing;
pub mod request;
pub mod retention;
pub mod signing;
pub mod storage;
pub mod upstream;

pub use config::{Config, ConfigError};
pub use coordinator::{
    CACHE_STATUS_HEADER, CacheStatus, CoordinatorError, CoordinatorRegistry, Resolution,
    StatsSnapshot,
};
pub use hashing::{Fingerprint, derive_fingerprint};
pub use request::{GenerationRequest, SignedResponse, ValidationError, validate_request};
pub use retention::{RetentionSweeper, SweepReport};
pub use signing::{Signer, SigningError};
pub use storage::{CacheEntry, CacheStore, FileStore, MemoryStore, StoreError, StoreResult};
#[cfg(any(test, feature = "mock"))]
pub use upstream::CountingUpstream;
pub use upstream::{Generation, HttpUpstream, MockUpstream, UpstreamCall, UpstreamClient, UpstreamError};
