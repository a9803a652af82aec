//! Request fingerprints.
//!
//! A [`Fingerprint`] is the BLAKE3 digest of a request's normalized parameter
//! tuple. It is both the cache key and the unit of single-flight coordination.

use std::fmt;

use blake3::Hasher;
use serde::{Deserialize, Serialize};

use crate::constants::{FINGERPRINT_DOMAIN, HEX_DIGEST_LEN};
use crate::request::GenerationRequest;

/// Lowercase hex BLAKE3 digest of a normalized request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Parses a 64-character lowercase hex string.
    pub fn parse(hex: &str) -> Option<Self> {
        let well_formed = hex.len() == HEX_DIGEST_LEN
            && hex
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        well_formed.then(|| Self(hex.to_string()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    #[inline]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Derives the fingerprint of `request`.
///
/// Defaults are substituted first (`systemPrompt` empty, `maxTokens` 150,
/// temperature 0), so a request that omits a field and one that spells out the
/// default collide on purpose. Every field is written with a little-endian
/// `u64` length prefix, which keeps `("ab", "c")` and `("a", "bc")` apart.
/// Field order is fixed: model, prompt, systemPrompt, temperature, seed,
/// maxTokens.
pub fn derive_fingerprint(request: &GenerationRequest) -> Fingerprint {
    let mut hasher = Hasher::new();
    write_field(&mut hasher, FINGERPRINT_DOMAIN);
    write_field(&mut hasher, request.model.as_bytes());
    write_field(&mut hasher, request.prompt.as_bytes());
    write_field(&mut hasher, request.system_prompt().as_bytes());
    write_field(&mut hasher, &request.temperature().to_le_bytes());
    write_field(&mut hasher, &request.seed.to_le_bytes());
    write_field(&mut hasher, &request.max_tokens().to_le_bytes());
    Fingerprint(hasher.finalize().to_hex().to_string())
}

#[inline]
fn write_field(hasher: &mut Hasher, bytes: &[u8]) {
    hasher.update(&(bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_MAX_TOKENS;
    use std::collections::HashSet;

    fn base() -> GenerationRequest {
        GenerationRequest::new("m", "p", 12345)
    }

    #[test]
    fn test_fingerprint_determinism() {
        let a = derive_fingerprint(&base());
        let b = derive_fingerprint(&base());
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), HEX_DIGEST_LEN);
    }

    #[test]
    fn test_defaults_collide_with_explicit_values() {
        let implicit = base();
        let explicit = base()
            .with_system_prompt("")
            .with_max_tokens(DEFAULT_MAX_TOKENS)
            .with_temperature(0.0);
        assert_eq!(derive_fingerprint(&implicit), derive_fingerprint(&explicit));
    }

    #[test]
    fn test_negative_zero_temperature_collides() {
        let a = base().with_temperature(0.0);
        let b = base().with_temperature(-0.0);
        assert_eq!(derive_fingerprint(&a), derive_fingerprint(&b));
    }

    #[test]
    fn test_every_field_changes_fingerprint() {
        let variants = [
            base(),
            GenerationRequest::new("m2", "p", 12345),
            GenerationRequest::new("m", "p2", 12345),
            base().with_system_prompt("sys"),
            base().with_max_tokens(151),
            GenerationRequest::new("m", "p", 12346),
        ];
        let fingerprints: HashSet<_> = variants.iter().map(derive_fingerprint).collect();
        assert_eq!(fingerprints.len(), variants.len());
    }

    #[test]
    fn test_differing_seeds_differ() {
        let a = GenerationRequest::new("m", "p", 11111);
        let b = GenerationRequest::new("m", "p", 22222);
        assert_ne!(derive_fingerprint(&a), derive_fingerprint(&b));
    }

    #[test]
    fn test_field_boundaries_are_unambiguous() {
        let a = GenerationRequest::new("ab", "c", 1);
        let b = GenerationRequest::new("a", "bc", 1);
        assert_ne!(derive_fingerprint(&a), derive_fingerprint(&b));

        let c = GenerationRequest::new("m", "p", 1).with_system_prompt("x");
        let d = GenerationRequest::new("m", "px", 1);
        assert_ne!(derive_fingerprint(&c), derive_fingerprint(&d));
    }

    #[test]
    fn test_fingerprint_is_lowercase_hex() {
        let fp = derive_fingerprint(&base());
        assert!(Fingerprint::parse(fp.as_str()).is_some());
        assert!(
            fp.as_str()
                .chars()
                .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase())
        );
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(Fingerprint::parse("abc").is_none());
        assert!(Fingerprint::parse(&"G".repeat(HEX_DIGEST_LEN)).is_none());
        assert!(Fingerprint::parse(&"A".repeat(HEX_DIGEST_LEN)).is_none());
        assert!(Fingerprint::parse(&"a".repeat(HEX_DIGEST_LEN)).is_some());
    }

    #[test]
    fn test_display_matches_as_str() {
        let fp = derive_fingerprint(&base());
        assert_eq!(fp.to_string(), fp.as_str());
    }
}
