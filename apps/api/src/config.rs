use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::llm_client::LlmSettings;

/// Application configuration loaded from environment variables.
/// Captured once at startup and cloned into `AppState`; nothing else reads the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub llm: LlmSettings,
    /// Temperature used for free-form generations when the request does not set one.
    pub default_temperature: f32,
    /// Overrides the built-in resume template when set.
    pub resume_template_path: Option<PathBuf>,
    /// When set, every successful generation is also written here as `.md` and `.docx`.
    pub export_dir: Option<PathBuf>,
    pub session_ttl_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so it can be tested without
    /// mutating the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Config {
            port: parse_or(&lookup, "PORT", 8080u16).context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            llm: LlmSettings::resolve(None, None, &lookup)?,
            default_temperature: parse_or(&lookup, "DEFAULT_TEMPERATURE", 0.6f32)
                .context("DEFAULT_TEMPERATURE must be a number")?,
            resume_template_path: non_empty(&lookup, "RESUME_TEMPLATE_PATH").map(PathBuf::from),
            export_dir: non_empty(&lookup, "EXPORT_DIR").map(PathBuf::from),
            session_ttl_secs: parse_or(&lookup, "SESSION_TTL_SECS", 86_400u64)
                .context("SESSION_TTL_SECS must be a whole number of seconds")?,
        })
    }
}

/// Returns the trimmed value for `key`, treating blank values as unset.
pub(crate) fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match non_empty(lookup, key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Invalid value '{raw}' for environment variable '{key}'")),
        None => Ok(default),
    }
}
