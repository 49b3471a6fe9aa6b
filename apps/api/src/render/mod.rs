// Markdown → document pipeline: template rendering, line classification, .docx output,
// and file naming. All file writes go through `export`.

pub mod docx;
pub mod export;
pub mod filename;
pub mod markdown;
pub mod template;
