//! OpenAI-compatible chat-completions transport (§4.5 "Transport contract").
//!
//! Grounded in the `emergence-runner/src/llm.rs` pattern: that module
//! dispatched between `OpenAiBackend`/`AnthropicBackend` through an
//! `LlmBackend` enum because async methods aren't dyn-compatible. Only one
//! transport is needed here, so the enum collapses to a single concrete
//! struct, but the lesson (enum dispatch over `dyn Trait` for async) carries
//! forward to [`crate::dispatch`]'s call-mode handling.

use std::time::Duration;

use crate::config::BackendConfig;
use crate::error::LlmError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// A client bound to one OpenAI-compatible chat-completions endpoint.
pub struct Transport {
    client: reqwest::Client,
    config: BackendConfig,
}

impl Transport {
    /// Build a transport, normalizing the configured URL onto
    /// `chat/completions` if it does not already end there.
    ///
    /// # Panics
    ///
    /// Panics if the underlying `reqwest` client cannot be constructed,
    /// which only happens if the TLS backend fails to initialize.
    #[must_use]
    pub fn new(config: BackendConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("reqwest client with TLS backend available");
        Self { client, config }
    }

    fn endpoint(&self) -> String {
        let trimmed = self.config.api_url.trim_end_matches('/');
        if trimmed.ends_with("chat/completions") {
            trimmed.to_owned()
        } else {
            format!("{trimmed}/chat/completions")
        }
    }

    /// Send `prompt` as a single user message and return the assistant's
    /// raw text content.
    ///
    /// # Errors
    ///
    /// Returns a categorized [`LlmError`] per §4.5's error mapping: 401,
    /// 403, 404, timeout, and connection failures are distinguished from
    /// other backend errors.
    pub async fn complete(&self, model: &str, prompt: &str) -> Result<String, LlmError> {
        let body = serde_json::json!({
            "model": model,
            "messages": [{"role": "user", "content": prompt}],
        });

        let response = self
            .client
            .post(self.endpoint())
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&body)
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(match status.as_u16() {
                401 => LlmError::InvalidApiKey,
                403 => LlmError::AccessDenied,
                404 => LlmError::EndpointNotFound,
                _ => {
                    let body = response.text().await.unwrap_or_default();
                    LlmError::Backend(format!("{status}: {body}"))
                }
            });
        }

        let json: serde_json::Value = response.json().await.map_err(|e| LlmError::Backend(e.to_string()))?;
        extract_content(&json)
    }
}

fn map_request_error(err: reqwest::Error) -> LlmError {
    if err.is_timeout() {
        LlmError::Timeout
    } else if err.is_connect() {
        LlmError::ConnectionFailed
    } else {
        LlmError::Backend(err.to_string())
    }
}

fn extract_content(json: &serde_json::Value) -> Result<String, LlmError> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or_else(|| LlmError::Backend(String::from("response missing choices[0].message.content")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn config() -> BackendConfig {
        BackendConfig {
            api_url: String::from("https://api.example.com/v1"),
            api_key: String::from("test-key"),
            normal_model: String::from("big-model"),
            fast_model: String::from("small-model"),
        }
    }

    #[test]
    fn endpoint_appends_chat_completions_when_missing() {
        let transport = Transport::new(config());
        assert_eq!(transport.endpoint(), "https://api.example.com/v1/chat/completions");
    }

    #[test]
    fn endpoint_left_unchanged_when_already_present() {
        let mut cfg = config();
        cfg.api_url = String::from("https://api.example.com/v1/chat/completions");
        let transport = Transport::new(cfg);
        assert_eq!(transport.endpoint(), "https://api.example.com/v1/chat/completions");
    }

    #[test]
    fn extract_content_valid_response() {
        let json = serde_json::json!({
            "choices": [{"message": {"content": "{\"feedback\": \"Accept\"}"}}]
        });
        let result = extract_content(&json).expect("content present");
        assert!(result.contains("Accept"));
    }

    #[test]
    fn extract_content_missing_choices() {
        let json = serde_json::json!({"error": "rate_limit"});
        assert!(extract_content(&json).is_err());
    }
}
