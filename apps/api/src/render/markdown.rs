//! Line-oriented Markdown → block classifier.
//!
//! Understands only the subset the generation prompts emit: `#`/`##`/`###` headings,
//! `- ` bullets, whole-line `**bold**`, blank lines, and plain text.
//!
//! Total over any input: every line maps to exactly one `Block`, in input order, and
//! classification never looks at neighbouring lines.

use serde::Serialize;

/// One output block per input line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Heading { level: u8, text: String },
    Paragraph { text: String },
    BulletItem { text: String },
    BoldLine { text: String },
    BlankSpacer,
}

/// Heading markers, longest first. A `### ` line must never match `## ` or `# `.
const HEADING_MARKERS: [(&str, u8); 3] = [("### ", 3), ("## ", 2), ("# ", 1)];
const BULLET_MARKER: &str = "- ";
const BOLD_MARKER: &str = "**";

/// Classifies a single line. First matching rule wins:
/// blank → heading (3, 2, 1) → bullet → bold line → paragraph.
pub fn classify_line(raw: &str) -> Block {
    let line = raw.trim_end();

    if line.is_empty() {
        return Block::BlankSpacer;
    }

    for (marker, level) in HEADING_MARKERS {
        if let Some(rest) = line.strip_prefix(marker) {
            return Block::Heading {
                level,
                text: rest.trim().to_string(),
            };
        }
    }

    if let Some(rest) = line.strip_prefix(BULLET_MARKER) {
        return Block::BulletItem {
            text: rest.trim().to_string(),
        };
    }

    // Length ≥ 4 keeps a bare `**` (or `***`) from being read as an empty bold line.
    if line.len() >= 2 * BOLD_MARKER.len() {
        if let Some(inner) = line
            .strip_prefix(BOLD_MARKER)
            .and_then(|rest| rest.strip_suffix(BOLD_MARKER))
        {
            return Block::BoldLine {
                text: inner.to_string(),
            };
        }
    }

    Block::Paragraph {
        text: line.to_string(),
    }
}

/// Splits `markdown` on line terminators and classifies every line.
/// Empty input yields no blocks.
pub fn parse_blocks(markdown: &str) -> Vec<Block> {
    markdown.lines().map(classify_line).collect()
}
