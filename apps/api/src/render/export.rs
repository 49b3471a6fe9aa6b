//! Writing generated documents to disk.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use super::docx::{markdown_to_docx, DocxError};
use super::filename::document_file_stem;
use crate::models::resume::GeneratedDocument;

/// Writes `bytes` to `path` through a temp file in the same directory, then renames
/// it into place.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Paths written by `export_document`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedFiles {
    pub markdown: PathBuf,
    pub docx: PathBuf,
}

/// Writes `<stem>.docx` and `<stem>.md` (raw generated text) into `dir`.
///
/// `Document::save` serializes before it touches the disk, and the `.md` is only
/// written once the `.docx` is in place, so a failure never leaves a lone `.md` behind.
pub fn export_document(dir: &Path, doc: &GeneratedDocument) -> Result<ExportedFiles, DocxError> {
    let stem = document_file_stem(&doc.display_name, doc.kind);
    let markdown = dir.join(format!("{stem}.md"));
    let docx = dir.join(format!("{stem}.docx"));

    markdown_to_docx(&doc.markdown, &doc.title()).save(&docx)?;
    write_atomic(&markdown, doc.markdown.as_bytes())?;

    Ok(ExportedFiles { markdown, docx })
}
