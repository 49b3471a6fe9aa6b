//! Axum route handlers for the generation and download API.

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::generator::{
    generate_cover_letter, generate_resume, CoverLetterRequest, ResumeRequest,
};
use crate::models::resume::{DocumentKind, GeneratedDocument};
use crate::render::docx::{markdown_to_docx, DOCX_MIME};
use crate::render::export::export_document;
use crate::render::filename::{document_file_stem, safe_filename};
use crate::state::AppState;

const MARKDOWN_MIME: &str = "text/markdown; charset=utf-8";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SessionCreatedResponse {
    pub session_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct DownloadLink {
    pub file_name: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct Downloads {
    pub markdown: DownloadLink,
    pub docx: DownloadLink,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub session_id: Uuid,
    pub kind: DocumentKind,
    pub markdown: String,
    pub downloads: Downloads,
    /// Files written to `EXPORT_DIR`, when configured.
    pub exported: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct RenderDocxRequest {
    pub markdown: String,
    pub title: Option<String>,
    /// Download name without extension; sanitized before use.
    pub file_name: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> Json<SessionCreatedResponse> {
    Json(SessionCreatedResponse {
        session_id: state.sessions.create().await,
    })
}

/// POST /api/v1/resumes/generate
///
/// Structured completion → resume template → Markdown, stored in the session's resume slot.
pub async fn handle_generate_resume(
    State(state): State<AppState>,
    Json(request): Json<ResumeRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    request.validate()?;
    let llm = state.llm()?;
    state.sessions.check(request.session_id).await?;

    let doc = generate_resume(llm, &state.resume_template, &request).await?;
    finish(&state, request.session_id, doc).await
}

/// POST /api/v1/cover-letters/generate
///
/// Free-form completion, seeded with the session's current resume when one exists.
pub async fn handle_generate_cover_letter(
    State(state): State<AppState>,
    Json(request): Json<CoverLetterRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    request.validate()?;
    let llm = state.llm()?;
    let current_resume = match request.session_id {
        Some(id) => state.sessions.get(id).await?.resume.map(|doc| doc.markdown),
        None => None,
    };

    let doc = generate_cover_letter(
        llm,
        &request,
        current_resume.as_deref(),
        state.config.default_temperature,
    )
    .await?;
    finish(&state, request.session_id, doc).await
}

/// GET /api/v1/sessions/:id/:kind/:format
///
/// `kind` is `resume` or `cover-letter`; `format` is `markdown` (or `md`) or `docx`.
pub async fn handle_download(
    State(state): State<AppState>,
    Path((session_id, kind, format)): Path<(Uuid, String, String)>,
) -> Result<Response, AppError> {
    let kind = DocumentKind::from_path_segment(&kind)
        .ok_or_else(|| AppError::NotFound(format!("Unknown document kind '{kind}'")))?;
    let doc = state.sessions.document(session_id, kind).await?;
    let stem = document_file_stem(&doc.display_name, kind);

    match format.as_str() {
        "markdown" | "md" => Ok(attachment(
            Bytes::from(doc.markdown),
            MARKDOWN_MIME,
            &format!("{stem}.md"),
        )),
        "docx" => {
            let bytes = markdown_to_docx(&doc.markdown, &doc.title()).to_bytes()?;
            Ok(attachment(Bytes::from(bytes), DOCX_MIME, &format!("{stem}.docx")))
        }
        other => Err(AppError::NotFound(format!("Unknown download format '{other}'"))),
    }
}

/// POST /api/v1/render/docx
///
/// Stateless Markdown → .docx conversion.
pub async fn handle_render_docx(
    Json(request): Json<RenderDocxRequest>,
) -> Result<Response, AppError> {
    let title = request
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or("Document");
    let file_name = format!(
        "{}.docx",
        safe_filename(request.file_name.as_deref().unwrap_or(""))
    );

    let bytes = markdown_to_docx(&request.markdown, title).to_bytes()?;
    Ok(attachment(Bytes::from(bytes), DOCX_MIME, &file_name))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Exports (if configured), then commits the document to its slot. Any failure before
/// the commit leaves the slot's previous document in place; without a `session_id` the
/// session itself is only created here, so failed generations leave nothing behind.
async fn finish(
    state: &AppState,
    session_id: Option<Uuid>,
    doc: GeneratedDocument,
) -> Result<Json<GenerateResponse>, AppError> {
    let exported = match &state.config.export_dir {
        Some(dir) => {
            let files = export_document(dir, &doc)?;
            Some(vec![
                files.markdown.display().to_string(),
                files.docx.display().to_string(),
            ])
        }
        None => None,
    };

    let kind = doc.kind;
    let markdown = doc.markdown.clone();
    let display_name = doc.display_name.clone();
    let session_id = state.sessions.store(session_id, doc).await?;
    let downloads = downloads(session_id, kind, &display_name);

    info!(
        "Stored {} in session {session_id} ({} chars)",
        kind.file_suffix(),
        markdown.len()
    );

    Ok(Json(GenerateResponse {
        session_id,
        kind,
        markdown,
        downloads,
        exported,
    }))
}

fn downloads(session_id: Uuid, kind: DocumentKind, display_name: &str) -> Downloads {
    let stem = document_file_stem(display_name, kind);
    let segment = match kind {
        DocumentKind::Resume => "resume",
        DocumentKind::CoverLetter => "cover-letter",
    };
    let base = format!("/api/v1/sessions/{session_id}/{segment}");
    Downloads {
        markdown: DownloadLink {
            file_name: format!("{stem}.md"),
            url: format!("{base}/markdown"),
        },
        docx: DownloadLink {
            file_name: format!("{stem}.docx"),
            url: format!("{base}/docx"),
        },
    }
}

fn attachment(body: Bytes, content_type: &'static str, file_name: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(content_type)),
            (header::CONTENT_DISPOSITION, content_disposition(file_name)),
        ],
        body,
    )
        .into_response()
}

/// `attachment` with an ASCII `filename` plus an RFC 5987 `filename*` for non-ASCII names.
fn content_disposition(file_name: &str) -> HeaderValue {
    let ascii: String = file_name
        .chars()
        .map(|c| if c.is_ascii() { c } else { '_' })
        .collect();
    let encoded: String = file_name
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'.' | b'_' | b'-' => (b as char).to_string(),
            _ => format!("%{b:02X}"),
        })
        .collect();

    HeaderValue::from_str(&format!(
        "attachment; filename=\"{ascii}\"; filename*=UTF-8''{encoded}"
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_ascii_name() {
        let value = content_disposition("Amulya_Goli_resume.md");
        assert_eq!(
            value.to_str().unwrap(),
            "attachment; filename=\"Amulya_Goli_resume.md\"; filename*=UTF-8''Amulya_Goli_resume.md"
        );
    }

    #[test]
    fn test_content_disposition_encodes_non_ascii() {
        let value = content_disposition("José_resume.md");
        let text = value.to_str().unwrap();
        assert!(text.contains("filename=\"Jos__resume.md\""));
        assert!(text.contains("filename*=UTF-8''Jos%C3%A9_resume.md"));
    }

    #[test]
    fn test_download_links_use_sanitized_names() {
        let id = Uuid::nil();
        let links = downloads(id, DocumentKind::CoverLetter, "Amulya Goli");
        assert_eq!(links.docx.file_name, "Amulya_Goli_cover_letter.docx");
        assert_eq!(
            links.markdown.url,
            format!("/api/v1/sessions/{id}/cover-letter/markdown")
        );
    }
}
