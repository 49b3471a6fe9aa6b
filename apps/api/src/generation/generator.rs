//! Document generation: one LLM call per action, then local rendering.
//!
//! Resume flow:       build_resume_prompt → complete_structured_as::<ResumeData>
//!                    → render_resume_markdown
//! Cover-letter flow: build_cover_letter_prompt (with resume highlights)
//!                    → complete_freeform
//!
//! Nothing here touches session state; callers validate the request up front and store
//! the returned document only on success.

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::prompts::{
    build_cover_letter_prompt, build_resume_prompt, resume_highlights,
};
use crate::llm_client::LlmClient;
use crate::models::profile::{CandidateProfile, JobDescription};
use crate::models::resume::{DocumentKind, GeneratedDocument, ResumeData};
use crate::models::style::StyleConfig;
use crate::render::template::render_resume_markdown;

/// Accepted sampling temperature range for free-form generations.
const TEMPERATURE_RANGE: std::ops::RangeInclusive<f32> = 0.0..=2.0;

// ────────────────────────────────────────────────────────────────────────────
// Requests
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ResumeRequest {
    /// Session whose resume slot receives the result; a new session when absent.
    pub session_id: Option<Uuid>,
    pub profile: CandidateProfile,
    pub job: JobDescription,
    #[serde(default)]
    pub style: StyleConfig,
    /// Pasted (or PDF-extracted) text of the candidate's current resume.
    pub existing_resume: Option<String>,
}

impl ResumeRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        self.profile.validate()?;
        self.job.validate()?;
        self.style.validate()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CoverLetterRequest {
    pub session_id: Option<Uuid>,
    pub profile: CandidateProfile,
    pub job: JobDescription,
    #[serde(default)]
    pub style: StyleConfig,
    pub temperature: Option<f32>,
}

impl CoverLetterRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        self.profile.validate()?;
        self.job.validate()?;
        self.style.validate()?;
        if let Some(t) = self.temperature {
            if !TEMPERATURE_RANGE.contains(&t) {
                return Err(AppError::Validation(format!(
                    "temperature must be between {} and {}",
                    TEMPERATURE_RANGE.start(),
                    TEMPERATURE_RANGE.end()
                )));
            }
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pipelines
// ────────────────────────────────────────────────────────────────────────────

/// Generates a tailored resume as Markdown.
pub async fn generate_resume(
    llm: &LlmClient,
    template: &str,
    request: &ResumeRequest,
) -> Result<GeneratedDocument, AppError> {
    let prompt = build_resume_prompt(
        &request.profile,
        &request.job,
        &request.style,
        request.existing_resume.as_deref(),
    );
    info!(
        "Generating resume for '{}' → {} at {}",
        request.profile.name, request.job.title, request.job.company
    );

    let data: ResumeData = llm.complete_structured_as(&prompt).await?;
    let markdown = render_resume_markdown(&data, &request.profile, template)?;

    info!(
        "Resume generated: {} roles, {} chars",
        data.experience.len(),
        markdown.len()
    );
    Ok(GeneratedDocument::new(
        DocumentKind::Resume,
        markdown,
        &request.profile.name,
    ))
}

/// Generates a tailored cover letter as Markdown.
///
/// `current_resume` is the session's resume Markdown, if any; its first 2000
/// characters are passed to the model as highlights.
pub async fn generate_cover_letter(
    llm: &LlmClient,
    request: &CoverLetterRequest,
    current_resume: Option<&str>,
    default_temperature: f32,
) -> Result<GeneratedDocument, AppError> {
    let highlights = current_resume.map(resume_highlights);
    let prompt = build_cover_letter_prompt(&request.profile, &request.job, &request.style, highlights);
    let temperature = request.temperature.unwrap_or(default_temperature);
    info!(
        "Generating cover letter for '{}' (temperature {temperature}, resume highlights: {})",
        request.profile.name,
        highlights.is_some()
    );

    let markdown = llm.complete_freeform(&prompt, temperature).await?;

    Ok(GeneratedDocument::new(
        DocumentKind::CoverLetter,
        markdown,
        &request.profile.name,
    ))
}
