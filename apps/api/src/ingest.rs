//! Existing-resume ingestion: pull plain text out of an uploaded PDF so it can be
//! passed back as `existing_resume` on the next resume generation.

use axum::{extract::Multipart, Json};
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;

/// Upload limit for the ingest route.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const PDF_MAGIC: &[u8] = b"%PDF-";
const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct IngestPdfResponse {
    pub file_name: Option<String>,
    pub text: String,
    pub characters: usize,
}

/// POST /api/v1/ingest/pdf  (multipart, field `file`)
pub async fn handle_ingest_pdf(mut multipart: Multipart) -> Result<Json<IngestPdfResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read upload: {e}")))?;

        // Text extraction is CPU-bound; keep it off the async workers.
        let text = tokio::task::spawn_blocking(move || extract_pdf_text(&data))
            .await
            .map_err(|e| {
                AppError::Internal(anyhow::anyhow!("spawn_blocking failed in PDF extraction: {e}"))
            })??;

        info!(
            "Extracted {} chars from uploaded PDF {:?}",
            text.len(),
            file_name
        );
        return Ok(Json(IngestPdfResponse {
            file_name,
            characters: text.chars().count(),
            text,
        }));
    }

    Err(AppError::Validation(format!(
        "multipart field '{FILE_FIELD}' is required"
    )))
}

/// Extracts text from PDF bytes and normalizes whitespace line by line.
pub fn extract_pdf_text(data: &[u8]) -> Result<String, AppError> {
    if !data.starts_with(PDF_MAGIC) {
        return Err(AppError::Validation(
            "Uploaded file is not a PDF".to_string(),
        ));
    }
    let raw = pdf_extract::extract_text_from_mem(data)
        .map_err(|e| AppError::Validation(format!("Could not read PDF: {e}")))?;
    Ok(normalize_extracted_text(&raw))
}

/// Trims each line and collapses runs of blank lines left behind by page breaks.
fn normalize_extracted_text(raw: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for line in raw.lines().map(str::trim) {
        if line.is_empty() && out.last().map_or(true, |l| l.is_empty()) {
            continue;
        }
        out.push(line);
    }
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    out.join("\n")
}
