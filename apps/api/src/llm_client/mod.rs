/// LLM Client — the single point of entry for all chat-completion calls.
///
/// ARCHITECTURAL RULE: No other module may call a provider API directly.
/// All LLM interactions MUST go through `LlmClient`.
///
/// The backend is picked once, at construction, from whichever credential is present:
/// OpenAI first, then Groq. There is no fallback between them at call time.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::config::{non_empty, parse_or};

pub mod prompts;
pub mod providers;

pub use providers::ChatCompletionsBackend;

use prompts::{MARKDOWN_SYSTEM, STRUCTURED_SYSTEM};

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.1-8b-instant";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
/// Temperature for structured (JSON) completions.
pub const STRUCTURED_TEMPERATURE: f32 = 0.4;
/// Max characters of the raw response echoed back in a format error.
const RAW_EXCERPT_CHARS: usize = 500;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("No API key found. Set OPENAI_API_KEY or GROQ_API_KEY in the environment.")]
    MissingCredential,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("Model did not return valid JSON. Raw: {raw}")]
    InvalidStructuredOutput { raw: String },
}

impl LlmError {
    fn invalid_output(text: &str) -> Self {
        LlmError::InvalidStructuredOutput {
            raw: text.chars().take(RAW_EXCERPT_CHARS).collect(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Provider selection
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAi,
    Groq,
}

impl Provider {
    pub fn name(self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Groq => "groq",
        }
    }

    pub fn endpoint(self) -> &'static str {
        match self {
            Provider::OpenAi => "https://api.openai.com/v1/chat/completions",
            Provider::Groq => "https://api.groq.com/openai/v1/chat/completions",
        }
    }
}

/// Credentials and model ids for both providers, resolved once at startup.
#[derive(Clone)]
pub struct LlmSettings {
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub groq_api_key: Option<String>,
    pub groq_model: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for LlmSettings {
    // Keys never reach logs.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSettings")
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "<set>"))
            .field("openai_model", &self.openai_model)
            .field("groq_api_key", &self.groq_api_key.as_ref().map(|_| "<set>"))
            .field("groq_model", &self.groq_model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl LlmSettings {
    /// Precedence: explicit argument > environment variable > built-in default.
    /// The explicit key and model apply to the OpenAI backend only.
    pub fn resolve<F>(
        api_key: Option<String>,
        model: Option<String>,
        lookup: &F,
    ) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let openai_api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .or_else(|| non_empty(lookup, "OPENAI_API_KEY"));
        let openai_model = model
            .filter(|m| !m.trim().is_empty())
            .or_else(|| non_empty(lookup, "OPENAI_MODEL"))
            .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string());

        Ok(LlmSettings {
            openai_api_key,
            openai_model,
            groq_api_key: non_empty(lookup, "GROQ_API_KEY"),
            groq_model: non_empty(lookup, "GROQ_MODEL")
                .unwrap_or_else(|| DEFAULT_GROQ_MODEL.to_string()),
            timeout: Duration::from_secs(parse_or(
                lookup,
                "LLM_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )?),
        })
    }

    /// Picks the provider, key, and model to use. OpenAI wins when both keys are present.
    pub fn select(&self) -> Result<(Provider, &str, &str), LlmError> {
        if let Some(key) = &self.openai_api_key {
            Ok((Provider::OpenAi, key.as_str(), self.openai_model.as_str()))
        } else if let Some(key) = &self.groq_api_key {
            Ok((Provider::Groq, key.as_str(), self.groq_model.as_str()))
        } else {
            Err(LlmError::MissingCredential)
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Backend trait
// ────────────────────────────────────────────────────────────────────────────

/// A chat-completion backend: one system message, one user message, text back.
///
/// Carried inside `LlmClient` as `Arc<dyn ChatBackend>`; swapped in tests.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    fn provider(&self) -> &'static str;
    fn model(&self) -> &str;
    async fn chat(&self, system: &str, user: &str, temperature: f32) -> Result<String, LlmError>;
}

/// The single LLM client used by the generation pipeline.
#[derive(Clone)]
pub struct LlmClient {
    backend: Arc<dyn ChatBackend>,
}

impl LlmClient {
    /// Builds the client for whichever credential is configured.
    /// Fails fast with `LlmError::MissingCredential` when none is.
    pub fn from_settings(settings: &LlmSettings) -> Result<Self, LlmError> {
        let (provider, api_key, model) = settings.select()?;
        let backend = ChatCompletionsBackend::new(provider, api_key, model, settings.timeout)?;
        Ok(Self::with_backend(Arc::new(backend)))
    }

    pub fn with_backend(backend: Arc<dyn ChatBackend>) -> Self {
        Self { backend }
    }

    pub fn provider(&self) -> &'static str {
        self.backend.provider()
    }

    pub fn model(&self) -> &str {
        self.backend.model()
    }

    /// Asks for JSON and returns the first balanced object found in the reply.
    pub async fn complete_structured(&self, prompt: &str) -> Result<Value, LlmError> {
        let text = self
            .backend
            .chat(STRUCTURED_SYSTEM, prompt, STRUCTURED_TEMPERATURE)
            .await?;

        extract_json_object(&text).inspect_err(|_| {
            warn!(
                "{} returned no parseable JSON object ({} chars)",
                self.provider(),
                text.len()
            )
        })
    }

    /// Like `complete_structured`, deserialized into `T`.
    pub async fn complete_structured_as<T: DeserializeOwned>(
        &self,
        prompt: &str,
    ) -> Result<T, LlmError> {
        let value = self.complete_structured(prompt).await?;
        serde_json::from_value(value.clone())
            .map_err(|_| LlmError::invalid_output(&value.to_string()))
    }

    /// Asks for Markdown and returns the reply as-is.
    pub async fn complete_freeform(
        &self,
        prompt: &str,
        temperature: f32,
    ) -> Result<String, LlmError> {
        self.backend
            .chat(MARKDOWN_SYSTEM, prompt, temperature)
            .await
    }
}

/// Extracts the first balanced top-level `{ ... }` object from `text` and parses it.
///
/// The scan starts at the first `{` and tracks nesting depth, ignoring braces inside
/// JSON strings, so prose after the object (even prose containing braces) is not
/// swallowed into it.
pub fn extract_json_object(text: &str) -> Result<Value, LlmError> {
    let start = text.find('{').ok_or_else(|| LlmError::invalid_output(text))?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut end = None;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    end = Some(start + offset);
                    break;
                }
            }
            _ => {}
        }
    }

    let end = end.ok_or_else(|| LlmError::invalid_output(text))?;
    serde_json::from_str(&text[start..=end]).map_err(|_| LlmError::invalid_output(text))
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// A backend that replays canned replies and records every call it receives.
    #[derive(Default)]
    pub struct ScriptedBackend {
        replies: Mutex<VecDeque<Result<String, LlmError>>>,
        pub calls: Mutex<Vec<(String, String, f32)>>,
    }

    impl ScriptedBackend {
        pub fn replying(replies: Vec<Result<String, LlmError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        fn provider(&self) -> &'static str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted-model"
        }

        async fn chat(
            &self,
            system: &str,
            user: &str,
            temperature: f32,
        ) -> Result<String, LlmError> {
            self.calls
                .lock()
                .unwrap()
                .push((system.to_string(), user.to_string(), temperature));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(LlmError::EmptyContent))
        }
    }
}
