/// LLM Client — the single point of entry for all chat-completion calls.
///
/// ARCHITECTURAL RULE: No other module may call the provider directly.
/// The chat engine depends on the `ChatModel` trait, never on `LlmClient`.
///
/// Speaks the OpenAI Chat Completions wire format, so any compatible base URL
/// works (Gemini's `/v1beta/openai` endpoint by default).
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{debug, warn};

pub mod types;

use crate::tools::ToolSpec;
use types::{ApiErrorEnvelope, ChatCompletion, ChatCompletionRequest, ChatMessage, ToolDefinition};

const MAX_ATTEMPTS: u32 = 3;
const DEFAULT_BACKOFF: Duration = Duration::from_millis(1000);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited: {message}")]
    RateLimited { message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

impl LlmError {
    /// Quota and rate-limit failures get their own advisory in the chat engine.
    pub fn is_quota(&self) -> bool {
        if matches!(self, LlmError::RateLimited { .. }) {
            return true;
        }
        let text = self.to_string().to_lowercase();
        ["quota", "limit", "rate"].iter().any(|needle| text.contains(needle))
    }

    fn is_retryable(&self) -> bool {
        match self {
            LlmError::Http(e) => e.is_timeout() || e.is_connect(),
            LlmError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// A chat-completion backend. Carried by the engine as `Arc<dyn ChatModel>`.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<ChatCompletion, LlmError>;
}

/// HTTP client for an OpenAI-compatible `/chat/completions` endpoint.
/// Retries timeouts, connection failures and 5xx responses with exponential
/// backoff. 429 is returned immediately.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    backoff: Duration,
}

impl LlmClient {
    pub fn new(
        api_key: String,
        base_url: &str,
        model: String,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            backoff: DEFAULT_BACKOFF,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    #[cfg(test)]
    fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    async fn send_once(
        &self,
        body: &ChatCompletionRequest<'_>,
    ) -> Result<ChatCompletion, LlmError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            let text = response.text().await?;
            return Ok(serde_json::from_str(&text)?);
        }

        let raw = response.text().await.unwrap_or_default();
        // Providers wrap the message in {"error": {"message": ...}}; fall back to the raw body.
        let message = serde_json::from_str::<ApiErrorEnvelope>(&raw)
            .map(|e| e.error.message)
            .unwrap_or(raw);

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimited { message });
        }
        Err(LlmError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl ChatModel for LlmClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<ChatCompletion, LlmError> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages,
            tools: tools.iter().map(ToolDefinition::from).collect(),
        };

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.send_once(&body).await {
                Ok(completion) => {
                    if let Some(usage) = &completion.usage {
                        debug!(
                            "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                            usage.prompt_tokens, usage.completion_tokens
                        );
                    }
                    return Ok(completion);
                }
                Err(e) if e.is_retryable() && attempt < MAX_ATTEMPTS => {
                    // Exponential backoff: 1s, 2s
                    let delay = self.backoff * (1 << (attempt - 1));
                    warn!(
                        "LLM call attempt {} failed ({}), retrying after {}ms...",
                        attempt,
                        e,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client_for(server: &mockito::ServerGuard) -> LlmClient {
        LlmClient::new(
            "test-key".to_string(),
            &server.url(),
            "test-model".to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
        .with_backoff(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_complete_sends_model_messages_and_tools() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(mockito::Matcher::AllOf(vec![
                mockito::Matcher::PartialJson(json!({
                    "model": "test-model",
                    "messages": [{"role": "system", "content": "sys"}, {"role": "user", "content": "hi"}]
                })),
                mockito::Matcher::Regex(r#""type":"function","function":\{"name":"record_user_details""#.to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "choices": [{"index": 0, "finish_reason": "stop",
                                 "message": {"role": "assistant", "content": "hello"}}],
                    "usage": {"prompt_tokens": 10, "completion_tokens": 2, "total_tokens": 12}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let registry = crate::tools::ToolRegistry::new(std::sync::Arc::new(
            crate::notifier::DisabledNotifier,
        ));
        let specs = registry.describe();
        let completion = client_for(&server)
            .complete(&[ChatMessage::system("sys"), ChatMessage::user("hi")], &specs[..1])
            .await
            .unwrap();

        mock.assert_async().await;
        let choice = &completion.choices[0];
        assert_eq!(choice.message.text(), Some("hello"));
        assert!(!choice.wants_tool_calls());
    }

    #[tokio::test]
    async fn test_429_is_rate_limited_without_retry() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_body(r#"{"error": {"message": "Resource has been exhausted (e.g. check quota)."}}"#)
            .expect(1)
            .create_async()
            .await;

        let err = client_for(&server)
            .complete(&[ChatMessage::user("hi")], &[])
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert!(matches!(err, LlmError::RateLimited { .. }));
        assert!(err.is_quota());
    }

    #[tokio::test]
    async fn test_server_errors_are_retried_then_fatal() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(503)
            .with_body("upstream unavailable")
            .expect(MAX_ATTEMPTS as usize)
            .create_async()
            .await;

        let err = client_for(&server)
            .complete(&[ChatMessage::user("hi")], &[])
            .await
            .unwrap_err();

        mock.assert_async().await;
        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "upstream unavailable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_client_errors_surface_provider_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(400)
            .with_body(r#"{"error": {"message": "Invalid JSON payload received."}}"#)
            .expect(1)
            .create_async()
            .await;

        let err = client_for(&server)
            .complete(&[ChatMessage::user("hi")], &[])
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "API error (status 400): Invalid JSON payload received."
        );
        assert!(!err.is_quota());
    }

    #[test]
    fn test_is_quota_matches_substrings_case_insensitively() {
        let err = LlmError::Api {
            status: 400,
            message: "Rate Limit Exceeded".to_string(),
        };
        assert!(err.is_quota());
        assert!(!LlmError::EmptyContent.is_quota());
    }
}
