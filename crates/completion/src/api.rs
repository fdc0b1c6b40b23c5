//! REST client for the messages-style completion endpoint.
//!
//! Wraps `POST /v1/messages` using [`reqwest`]: request building,
//! status/error mapping, and extraction of text plus token usage from
//! the response body.

use promptforge_core::pricing::TokenUsage;
use serde::{Deserialize, Serialize};

use crate::provider::Completion;

/// Default request timeout for a single completion call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Message role in a completion request.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One conversation turn in a completion request.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A single completion request.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub max_tokens: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub messages: Vec<Message>,
}

// ---------------------------------------------------------------------------
// Response body
// ---------------------------------------------------------------------------

/// Raw response body from the completion endpoint.
#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    pub content: Vec<ContentBlock>,
    pub usage: UsageBlock,
    pub stop_reason: Option<String>,
    pub model: String,
}

/// One content block in the response. Only `text` blocks are used.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

/// Token usage block in the response body.
#[derive(Debug, Deserialize)]
pub struct UsageBlock {
    pub input_tokens: i64,
    pub output_tokens: i64,
    #[serde(default)]
    pub cache_read_input_tokens: i64,
    #[serde(default)]
    pub cache_creation_input_tokens: i64,
}

impl CompletionResponse {
    /// Concatenated text of all text content blocks.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|b| match b {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// Usage in the engine's token vocabulary.
    pub fn token_usage(&self) -> TokenUsage {
        TokenUsage {
            input_tokens: self.usage.input_tokens,
            output_tokens: self.usage.output_tokens,
            cache_read_tokens: self.usage.cache_read_input_tokens,
            cache_write_tokens: self.usage.cache_creation_input_tokens,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from the completion API layer.
#[derive(Debug, thiserror::Error)]
pub enum CompletionApiError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Completion API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The response parsed but contained no usable text.
    #[error("Malformed completion response: {0}")]
    Malformed(String),
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for one completion provider endpoint.
pub struct CompletionApi {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl CompletionApi {
    /// Create a client with the default per-call timeout.
    ///
    /// * `api_url` - Base URL, e.g. `https://api.anthropic.com`.
    /// * `api_key` - Bearer credential for the provider.
    pub fn new(api_url: String, api_key: String) -> Self {
        Self::with_timeout(api_url, api_key, DEFAULT_TIMEOUT_SECS)
    }

    /// Create a client with an explicit per-call timeout in seconds.
    /// A timed-out call surfaces as [`CompletionApiError::Request`].
    pub fn with_timeout(api_url: String, api_key: String, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            client,
            api_url,
            api_key,
        }
    }

    /// Execute one completion call.
    pub async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<Completion, CompletionApiError> {
        let response = self
            .client
            .post(format!("{}/v1/messages", self.api_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(request)
            .send()
            .await?;

        let body: CompletionResponse = Self::parse_response(response).await?;
        let text = body.text();
        if text.is_empty() {
            return Err(CompletionApiError::Malformed(
                "response contained no text content".to_string(),
            ));
        }

        tracing::debug!(
            model = %body.model,
            input_tokens = body.usage.input_tokens,
            output_tokens = body.usage.output_tokens,
            stop_reason = body.stop_reason.as_deref().unwrap_or("none"),
            "Completion call finished",
        );

        Ok(Completion {
            usage: body.token_usage(),
            stop_reason: body.stop_reason,
            model: body.model,
            text,
        })
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code, then parse JSON.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, CompletionApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(CompletionApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json::<T>().await?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_text_concatenates_text_blocks() {
        let body: CompletionResponse = serde_json::from_value(serde_json::json!({
            "content": [
                {"type": "text", "text": "Hello "},
                {"type": "text", "text": "world"}
            ],
            "usage": {"input_tokens": 10, "output_tokens": 5},
            "stop_reason": "end_turn",
            "model": "claude-sonnet-4-5"
        }))
        .unwrap();
        assert_eq!(body.text(), "Hello world");
    }

    #[test]
    fn response_ignores_non_text_blocks() {
        let body: CompletionResponse = serde_json::from_value(serde_json::json!({
            "content": [
                {"type": "tool_use", "id": "x", "name": "y", "input": {}},
                {"type": "text", "text": "just this"}
            ],
            "usage": {"input_tokens": 1, "output_tokens": 1},
            "stop_reason": null,
            "model": "claude-sonnet-4-5"
        }))
        .unwrap();
        assert_eq!(body.text(), "just this");
    }

    #[test]
    fn usage_maps_cache_fields() {
        let body: CompletionResponse = serde_json::from_value(serde_json::json!({
            "content": [{"type": "text", "text": "t"}],
            "usage": {
                "input_tokens": 100,
                "output_tokens": 50,
                "cache_read_input_tokens": 30,
                "cache_creation_input_tokens": 7
            },
            "stop_reason": "end_turn",
            "model": "claude-sonnet-4-5"
        }))
        .unwrap();
        let usage = body.token_usage();
        assert_eq!(usage.input_tokens, 100);
        assert_eq!(usage.output_tokens, 50);
        assert_eq!(usage.cache_read_tokens, 30);
        assert_eq!(usage.cache_write_tokens, 7);
    }

    #[test]
    fn usage_cache_fields_default_to_zero() {
        let body: CompletionResponse = serde_json::from_value(serde_json::json!({
            "content": [{"type": "text", "text": "t"}],
            "usage": {"input_tokens": 1, "output_tokens": 2},
            "stop_reason": null,
            "model": "m"
        }))
        .unwrap();
        let usage = body.token_usage();
        assert_eq!(usage.cache_read_tokens, 0);
        assert_eq!(usage.cache_write_tokens, 0);
    }

    #[test]
    fn request_serializes_without_system_when_absent() {
        let req = CompletionRequest {
            model: "m".to_string(),
            max_tokens: 10,
            system: None,
            messages: vec![Message::user("hi")],
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("system").is_none());
        assert_eq!(json["messages"][0]["role"], "user");
    }
}
