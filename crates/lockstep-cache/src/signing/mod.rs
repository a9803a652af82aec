//! Response signatures.
//!
//! Signatures are BLAKE3 keyed hashes (a MAC). A verifier holding the
//! shared secret recomputes them as:
//!
//! ```text
//! key = blake3::derive_key(SIGNING_CONTEXT, utf8(secret))
//! msg = u64_le(len(fp)) || ascii(fp) || u64_le(len(content)) || utf8(content)
//! sig = lowercase_hex(blake3::keyed_hash(key, msg))
//! ```
//!
//! `fp` is the 64-character hex fingerprint and lengths are byte counts.
//! See [`SIGNING_CONTEXT`] for the context string.

pub mod error;

pub use error::SigningError;

use std::fmt;

use crate::constants::SIGNING_CONTEXT;
use crate::hashing::Fingerprint;

/// Signs and verifies response content with a fixed secret.
#[derive(Clone)]
pub struct Signer {
    key: [u8; 32],
}

impl Signer {
    /// Builds a signer. Fails if `secret` is empty or whitespace.
    pub fn new(secret: &str) -> Result<Self, SigningError> {
        if secret.trim().is_empty() {
            return Err(SigningError::MissingSecret);
        }
        Ok(Self {
            key: blake3::derive_key(SIGNING_CONTEXT, secret.as_bytes()),
        })
    }

    /// Returns the lowercase hex signature of `(fingerprint, content)`.
    pub fn sign(&self, fingerprint: &Fingerprint, content: &str) -> String {
        self.mac(fingerprint.as_bytes(), content.as_bytes())
            .to_hex()
            .to_string()
    }

    /// Checks `signature` against `(fingerprint, content)` in constant time.
    pub fn verify(&self, fingerprint: &Fingerprint, content: &str, signature: &str) -> bool {
        match blake3::Hash::from_hex(signature) {
            Ok(expected) => self.mac(fingerprint.as_bytes(), content.as_bytes()) == expected,
            Err(_) => false,
        }
    }

    fn mac(&self, fingerprint: &[u8], content: &[u8]) -> blake3::Hash {
        let mut hasher = blake3::Hasher::new_keyed(&self.key);
        hasher.update(&(fingerprint.len() as u64).to_le_bytes());
        hasher.update(fingerprint);
        hasher.update(&(content.len() as u64).to_le_bytes());
        hasher.update(content);
        hasher.finalize()
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer").field("key", &"<redacted>").finish()
    }
}

/// One-shot form of [`Signer::sign`].
pub fn sign(fingerprint: &Fingerprint, content: &str, secret: &str) -> Result<String, SigningError> {
    Ok(Signer::new(secret)?.sign(fingerprint, content))
}
