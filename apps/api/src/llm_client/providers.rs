//! OpenAI-compatible chat-completions transport, shared by the OpenAI and Groq backends.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ChatBackend, LlmError, Provider};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// Text content of the first choice.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Chat-completions backend for one provider, fixed at construction.
pub struct ChatCompletionsBackend {
    client: Client,
    provider: Provider,
    api_key: String,
    model: String,
}

impl ChatCompletionsBackend {
    pub fn new(
        provider: Provider,
        api_key: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            provider,
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }
}

#[async_trait]
impl ChatBackend for ChatCompletionsBackend {
    fn provider(&self) -> &'static str {
        self.provider.name()
    }

    fn model(&self) -> &str {
        &self.model
    }

    /// One request, no retries. Non-2xx responses become `LlmError::Api`.
    async fn chat(&self, system: &str, user: &str, temperature: f32) -> Result<String, LlmError> {
        let request_body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature,
        };

        let response = self
            .client
            .post(self.provider.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), body));
        }

        let chat_response: ChatResponse = response.json().await?;

        if let Some(usage) = &chat_response.usage {
            debug!(
                "{} call succeeded: prompt_tokens={}, completion_tokens={}",
                self.provider.name(),
                usage.prompt_tokens,
                usage.completion_tokens
            );
        }

        chat_response
            .text()
            .filter(|t| !t.trim().is_empty())
            .map(str::to_string)
            .ok_or(LlmError::EmptyContent)
    }
}

/// Uses the provider's `error.message` when the body carries one, else the raw body.
fn api_error(status: u16, body: String) -> LlmError {
    let message = serde_json::from_str::<ApiError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    LlmError::Api { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_text_reads_first_choice() {
        let body = r#"{
            "choices": [{"message": {"role": "assistant", "content": "hello"}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 2, "total_tokens": 12}
        }"#;
        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.text(), Some("hello"));
        assert_eq!(parsed.usage.unwrap().completion_tokens, 2);
    }

    #[test]
    fn test_response_without_choices_has_no_text() {
        let parsed: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(parsed.text().is_none());
    }

    #[test]
    fn test_api_error_prefers_provider_message() {
        let err = api_error(
            401,
            r#"{"error": {"message": "Invalid API key", "type": "auth"}}"#.to_string(),
        );
        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid API key");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_api_error_falls_back_to_raw_body() {
        match api_error(502, "Bad Gateway".to_string()) {
            LlmError::Api { message, .. } => assert_eq!(message, "Bad Gateway"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_request_serializes_system_then_user() {
        let request = ChatRequest {
            model: "gpt-4o-mini",
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "s",
                },
                ChatMessage {
                    role: "user",
                    content: "u",
                },
            ],
            temperature: 0.4,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "u");
        assert_eq!(value["model"], "gpt-4o-mini");
    }

    #[test]
    fn test_provider_endpoints() {
        assert!(Provider::OpenAi.endpoint().contains("api.openai.com"));
        assert!(Provider::Groq.endpoint().contains("api.groq.com"));
    }
}
