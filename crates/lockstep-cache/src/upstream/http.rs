//! OpenAI-compatible `/chat/completions` client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use tracing::{debug, warn};

use super::{Generation, UpstreamCall, UpstreamClient, UpstreamError};
use crate::constants::UPSTREAM_ERROR_BODY_LIMIT;

/// Default request timeout.
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(120);

/// Calls `{base_url}/chat/completions` with a bearer token.
#[derive(Clone)]
pub struct HttpUpstream {
    http: HttpClient,
    endpoint: String,
    api_key: String,
}

impl HttpUpstream {
    /// Creates a client for `base_url` (e.g. `https://api.openai.com/v1`).
    pub fn new(base_url: &str, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http: HttpClient::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| HttpClient::new()),
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl std::fmt::Debug for HttpUpstream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpUpstream")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl UpstreamClient for HttpUpstream {
    async fn generate(&self, call: &UpstreamCall) -> Result<Generation, UpstreamError> {
        debug!(model = %call.model, seed = call.seed, "Calling upstream");

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request_body(call))
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| UpstreamError::Transport(e.without_url().to_string()))?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "Upstream returned an error status");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body: truncate_body(&body, UPSTREAM_ERROR_BODY_LIMIT),
            });
        }

        parse_completion(&body)
    }
}

pub(crate) fn request_body(call: &UpstreamCall) -> serde_json::Value {
    let mut messages = Vec::with_capacity(2);
    if !call.system_prompt.is_empty() {
        messages.push(serde_json::json!({"role": "system", "content": call.system_prompt}));
    }
    messages.push(serde_json::json!({"role": "user", "content": call.prompt}));

    serde_json::json!({
        "model": call.model,
        "messages": messages,
        "temperature": call.temperature,
        "seed": call.seed,
        "max_tokens": call.max_tokens,
    })
}

#[derive(Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Extracts the first choice's text from a chat completion body.
pub(crate) fn parse_completion(body: &str) -> Result<Generation, UpstreamError> {
    let completion: ChatCompletion = serde_json::from_str(body)
        .map_err(|e| UpstreamError::InvalidResponse(e.to_string()))?;

    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or(UpstreamError::EmptyResponse)?;

    let content = choice
        .message
        .and_then(|m| m.content)
        .filter(|c| !c.trim().is_empty())
        .ok_or(UpstreamError::EmptyResponse)?;

    Ok(Generation {
        content,
        finish_reason: choice.finish_reason,
    })
}

/// Truncates `body` to at most `limit` characters, marking the cut.
pub(crate) fn truncate_body(body: &str, limit: usize) -> String {
    match body.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}…", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::GenerationRequest;

    #[test]
    fn test_request_body_shape() {
        let call = UpstreamCall::from_request(
            &GenerationRequest::new("m", "p", 12345).with_system_prompt("sys"),
        );
        let body = request_body(&call);
        assert_eq!(body["model"], "m");
        assert_eq!(body["temperature"], 0.0);
        assert_eq!(body["seed"], 12345);
        assert_eq!(body["max_tokens"], 150);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "p");
    }

    #[test]
    fn test_request_body_omits_empty_system_prompt() {
        let call = UpstreamCall::from_request(&GenerationRequest::new("m", "p", 1));
        let body = request_body(&call);
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["role"], "user");
    }

    #[test]
    fn test_parse_completion_success() {
        let body = r#"{"id":"x","choices":[{"index":0,"message":{"role":"assistant","content":"hi"},"finish_reason":"stop"}]}"#;
        let generation = parse_completion(body).unwrap();
        assert_eq!(generation.content, "hi");
        assert_eq!(generation.finish_reason.as_deref(), Some("stop"));
    }

    #[test]
    fn test_parse_completion_empty_choices() {
        assert_eq!(
            parse_completion(r#"{"choices":[]}"#).unwrap_err(),
            UpstreamError::EmptyResponse
        );
        assert_eq!(
            parse_completion(r#"{"id":"x"}"#).unwrap_err(),
            UpstreamError::EmptyResponse
        );
    }

    #[test]
    fn test_parse_completion_null_or_blank_content() {
        let null = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
        assert_eq!(parse_completion(null).unwrap_err(), UpstreamError::EmptyResponse);
        let blank = r#"{"choices":[{"message":{"role":"assistant","content":"  "}}]}"#;
        assert_eq!(parse_completion(blank).unwrap_err(), UpstreamError::EmptyResponse);
    }

    #[test]
    fn test_parse_completion_garbage() {
        assert!(matches!(
            parse_completion("<html>bad gateway</html>").unwrap_err(),
            UpstreamError::InvalidResponse(_)
        ));
    }

    #[test]
    fn test_truncate_body() {
        assert_eq!(truncate_body("short", 10), "short");
        assert_eq!(truncate_body("abcdef", 3), "abc…");
        assert_eq!(truncate_body("ééé", 2), "éé…");
    }

    #[test]
    fn test_endpoint_and_debug_redaction() {
        let upstream = HttpUpstream::new("http://localhost:9/v1/", "sk-secret", DEFAULT_UPSTREAM_TIMEOUT);
        assert_eq!(upstream.endpoint(), "http://localhost:9/v1/chat/completions");
        let rendered = format!("{:?}", upstream);
        assert!(!rendered.contains("sk-secret"));
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_transport_error() {
        let upstream = HttpUpstream::new("http://127.0.0.1:9", "k", Duration::from_millis(500));
        let call = UpstreamCall::from_request(&GenerationRequest::new("m", "p", 1));
        let err = upstream.generate(&call).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Transport(_)));
    }
}
