//! Shared defaults.
//!
//! These values are part of the fingerprint and signature contracts: changing
//! `DEFAULT_MAX_TOKENS`, `FINGERPRINT_DOMAIN` or `SIGNING_CONTEXT` changes every
//! fingerprint or signature the gateway produces.

/// `maxTokens` used when a request omits it.
pub const DEFAULT_MAX_TOKENS: u32 = 150;

/// Retention horizon applied by the sweeper unless configured otherwise.
pub const DEFAULT_RETENTION_DAYS: u64 = 90;

/// Seconds between background sweeps (one day).
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 24 * 60 * 60;

/// Service name reported by `/health`.
pub const DEFAULT_SERVICE_NAME: &str = "lockstep";

/// Domain tag hashed ahead of every fingerprint tuple.
pub const FINGERPRINT_DOMAIN: &[u8] = b"lockstep.fingerprint.v1";

/// BLAKE3 `derive_key` context for the signing key.
pub const SIGNING_CONTEXT: &str = "lockstep 2026-01 response signing key v1";

/// Length of a hex-encoded fingerprint or signature.
pub const HEX_DIGEST_LEN: usize = 64;

/// Upstream error bodies are truncated to this many characters in messages.
pub const UPSTREAM_ERROR_BODY_LIMIT: usize = 512;

/// Milliseconds in one day.
pub const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;
