//! LLM gateway client
//!
//! Thin chat-completion client over an OpenAI-compatible API. The service
//! layer drives it through the `ChatClient` trait so generation logic can
//! be tested without network access.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::LlmConfig;

/// Token usage reported by the upstream API for one completion
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: i64,
    #[serde(default)]
    pub completion_tokens: i64,
}

impl TokenUsage {
    /// Sum usage across multiple completions
    pub fn add(&mut self, other: TokenUsage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
    }
}

/// One completed chat call: the assistant text plus its token usage
#[derive(Debug, Clone)]
pub struct Completion {
    pub content: String,
    pub usage: TokenUsage,
}

/// A single chat-completion request
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Optional system message prepended to the conversation
    pub system: Option<String>,
    pub prompt: String,
    pub temperature: f64,
    /// Completion length cap; omitted from the request when None
    pub max_tokens: Option<u32>,
}

/// LLM client errors
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Upstream API error (status {status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("Upstream returned no completion choices")]
    EmptyResponse,

    #[error("LLM API key is not configured")]
    MissingApiKey,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Chat completion client trait
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<Completion, LlmError>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: TokenUsage,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: String,
}

/// HTTP chat client talking to an OpenAI-compatible endpoint
///
/// A missing API key is not a construction error; requests fail with
/// `MissingApiKey` so the rest of the service can run without one.
pub struct HttpChatClient {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    model: String,
}

impl HttpChatClient {
    /// Build a client from configuration
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl ChatClient for HttpChatClient {
    async fn complete(&self, request: &ChatRequest) -> Result<Completion, LlmError> {
        let api_key = self.api_key.as_ref().ok_or(LlmError::MissingApiKey)?;

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });

        let body = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse = response.json().await?;
        let choice = parsed.choices.into_iter().next().ok_or(LlmError::EmptyResponse)?;

        Ok(Completion {
            content: choice.message.content,
            usage: parsed.usage,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_add() {
        let mut usage = TokenUsage {
            prompt_tokens: 10,
            completion_tokens: 20,
        };
        usage.add(TokenUsage {
            prompt_tokens: 5,
            completion_tokens: 7,
        });
        assert_eq!(usage.prompt_tokens, 15);
        assert_eq!(usage.completion_tokens, 27);
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_at_request_time() {
        let config = LlmConfig {
            api_key: None,
            ..Default::default()
        };
        let client = HttpChatClient::new(&config).expect("Construction should succeed");

        let result = client
            .complete(&ChatRequest {
                system: None,
                prompt: "hi".to_string(),
                temperature: 0.7,
                max_tokens: None,
            })
            .await;
        assert!(matches!(result, Err(LlmError::MissingApiKey)));
    }

    #[test]
    fn test_response_parsing() {
        let raw = r#"{
            "choices": [{"message": {"role": "assistant", "content": "Hello"}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 34, "total_tokens": 46}
        }"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content, "Hello");
        assert_eq!(parsed.usage.prompt_tokens, 12);
        assert_eq!(parsed.usage.completion_tokens, 34);
    }
}
