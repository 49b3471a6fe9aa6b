use std::sync::Arc;

use crate::config::Config;
use crate::errors::AppError;
use crate::generation::sessions::SessionStore;
use crate::llm_client::{LlmClient, LlmError};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// `None` when no API credential was configured; generation routes then answer
    /// with a configuration error instead of the server refusing to start.
    pub llm: Option<LlmClient>,
    pub sessions: SessionStore,
    pub config: Config,
    /// Resume template text, loaded once at startup.
    pub resume_template: Arc<str>,
}

impl AppState {
    pub fn new(config: Config, llm: Option<LlmClient>, resume_template: impl Into<Arc<str>>) -> Self {
        Self {
            llm,
            sessions: SessionStore::new(config.session_ttl_secs),
            config,
            resume_template: resume_template.into(),
        }
    }

    pub fn llm(&self) -> Result<&LlmClient, AppError> {
        self.llm
            .as_ref()
            .ok_or(AppError::Llm(LlmError::MissingCredential))
    }
}
