//! Caller-facing request and response types.

pub mod error;
pub mod validation;

pub use error::ValidationError;
pub use validation::validate_request;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_MAX_TOKENS;

/// Generation parameters supplied by a caller.
///
/// Optional fields are kept as `Option` so that the wire form round-trips
/// unchanged; use the accessor methods to read them with defaults applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// Upstream model identifier.
    pub model: String,
    /// User prompt.
    pub prompt: String,
    /// Optional system prompt (defaults to empty).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    /// Sampling temperature. Only `0` is accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Completion token limit (defaults to [`DEFAULT_MAX_TOKENS`]).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Caller-chosen seed, passed to the upstream verbatim.
    pub seed: i64,
}

impl GenerationRequest {
    /// Creates a request with all optional fields unset.
    pub fn new(model: impl Into<String>, prompt: impl Into<String>, seed: i64) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system_prompt: None,
            temperature: None,
            max_tokens: None,
            seed,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// System prompt with the empty default applied.
    #[inline]
    pub fn system_prompt(&self) -> &str {
        self.system_prompt.as_deref().unwrap_or("")
    }

    /// Token limit with the default applied.
    #[inline]
    pub fn max_tokens(&self) -> u32 {
        self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }

    /// Temperature with the default applied and `-0.0` folded into `0.0`.
    #[inline]
    pub fn temperature(&self) -> f64 {
        match self.temperature {
            Some(t) if t != 0.0 => t,
            _ => 0.0,
        }
    }
}

/// Response returned to callers of `/generate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedResponse {
    pub content: String,
    pub model: String,
    pub seed: i64,
    pub fingerprint: String,
    pub signature: String,
    /// `true` when the entry already existed or an in-flight generation was joined.
    pub cache_hit: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied_by_accessors() {
        let req = GenerationRequest::new("m", "p", 7);
        assert_eq!(req.system_prompt(), "");
        assert_eq!(req.max_tokens(), DEFAULT_MAX_TOKENS);
        assert_eq!(req.temperature(), 0.0);
    }

    #[test]
    fn test_negative_zero_temperature_normalized() {
        let req = GenerationRequest::new("m", "p", 7).with_temperature(-0.0);
        assert!(req.temperature().is_sign_positive());
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let req = GenerationRequest::new("m", "p", 1)
            .with_system_prompt("sys")
            .with_max_tokens(20);
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["systemPrompt"], "sys");
        assert_eq!(value["maxTokens"], 20);
        assert!(value.get("temperature").is_none());
    }

    #[test]
    fn test_signed_response_serializes_cache_hit() {
        let resp = SignedResponse {
            content: "c".into(),
            model: "m".into(),
            seed: 1,
            fingerprint: "f".into(),
            signature: "s".into(),
            cache_hit: true,
        };
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["cacheHit"], true);
    }
}
