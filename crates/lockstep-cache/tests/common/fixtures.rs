//! Test fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use lockstep::storage::CacheStore;
use lockstep::{CoordinatorRegistry, CountingUpstream, GenerationRequest, Signer};
use serde_json::{Value, json};

pub const TEST_SECRET: &str = "integration-test-secret";

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

pub fn request_body(prompt: &str, seed: i64) -> Value {
    json!({
        "model": DEFAULT_MODEL,
        "prompt": prompt,
        "seed": seed,
        "temperature": 0,
    })
}

pub fn request(prompt: &str, seed: i64) -> GenerationRequest {
    GenerationRequest::new(DEFAULT_MODEL, prompt, seed)
}

pub fn signer() -> Signer {
    Signer::new(TEST_SECRET).expect("test secret is non-empty")
}

pub fn registry(store: Arc<dyn CacheStore>, upstream: &CountingUpstream) -> CoordinatorRegistry {
    CoordinatorRegistry::new(store, Arc::new(upstream.clone()))
}
