// Cross-cutting system prompts. Document-specific prompt templates live in
// generation/prompts.rs.

/// System prompt for structured (JSON) completions.
pub const STRUCTURED_SYSTEM: &str = "Return strictly valid JSON unless told otherwise.";

/// System prompt for free-form Markdown completions.
pub const MARKDOWN_SYSTEM: &str = "Return clean Markdown.";
