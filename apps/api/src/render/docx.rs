//! Minimal Office Open XML (`.docx`) writer for classified Markdown blocks.
//!
//! Produces a package with one body part plus styles, a bullet numbering definition,
//! and core properties carrying the document title. Block mapping:
//!
//! - `Heading` → paragraph styled `Heading1`..`Heading3`, left aligned
//! - `BulletItem` → paragraph styled `ListBullet`
//! - `BoldLine` → plain paragraph holding a single bold run
//! - `Paragraph` / `BlankSpacer` → plain paragraph (empty for spacers)

use std::borrow::Cow;
use std::io::{Cursor, Write};
use std::path::Path;

use chrono::Utc;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::export::write_atomic;
use super::markdown::{parse_blocks, Block};

pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
const OFFICE_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Twentieths of a point. 1440 = one inch.
const PAGE_WIDTH: &str = "12240";
const PAGE_HEIGHT: &str = "15840";
const PAGE_MARGIN: &str = "1440";

/// Heading sizes in half-points, indexed by level - 1.
const HEADING_SIZES: [u32; 3] = [32, 26, 24];
const BULLET_NUM_ID: &str = "1";

#[derive(Debug, Error)]
pub enum DocxError {
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Body font applied through the `Normal` style and document defaults.
#[derive(Debug, Clone, PartialEq)]
struct DocumentStyle {
    pub font_family: String,
    pub font_size_pt: u8,
}

impl Default for DocumentStyle {
    fn default() -> Self {
        Self {
            font_family: "Calibri".to_string(),
            font_size_pt: 11,
        }
    }
}

/// An in-memory word-processing document built from blocks in order.
#[derive(Debug, Clone)]
pub struct Document {
    title: String,
    style: DocumentStyle,
    blocks: Vec<Block>,
}

impl Document {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            style: DocumentStyle::default(),
            blocks: Vec::new(),
        }
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Serializes the whole package into `.docx` bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, DocxError> {
        let parts: [(&str, Vec<u8>); 7] = [
            ("[Content_Types].xml", content_types_xml()?),
            ("_rels/.rels", package_rels_xml()?),
            ("docProps/core.xml", core_xml(&self.title)?),
            ("word/_rels/document.xml.rels", document_rels_xml()?),
            ("word/styles.xml", styles_xml(&self.style)?),
            ("word/numbering.xml", numbering_xml()?),
            ("word/document.xml", document_xml(&self.blocks)?),
        ];

        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, bytes) in parts {
            zip.start_file(name, options)?;
            zip.write_all(&bytes)?;
        }
        Ok(zip.finish()?.into_inner())
    }

    /// Writes the document to `path`. The file is replaced atomically, so a failed
    /// write never leaves a truncated document behind.
    pub fn save(&self, path: &Path) -> Result<(), DocxError> {
        let bytes = self.to_bytes()?;
        write_atomic(path, &bytes)?;
        Ok(())
    }
}

/// Classifies `markdown` line by line and appends every block to a new document.
pub fn markdown_to_docx(markdown: &str, title: &str) -> Document {
    let mut doc = Document::new(title);
    for block in parse_blocks(markdown) {
        doc.push(block);
    }
    doc
}

// ────────────────────────────────────────────────────────────────────────────
// XML helpers
// ────────────────────────────────────────────────────────────────────────────

type XmlWriter = Writer<Cursor<Vec<u8>>>;

fn emit(writer: &mut XmlWriter, event: Event<'_>) -> Result<(), DocxError> {
    writer.write_event(event).map_err(quick_xml::Error::from)?;
    Ok(())
}

fn start(writer: &mut XmlWriter, name: &str, attrs: &[(&str, &str)]) -> Result<(), DocxError> {
    emit(
        writer,
        Event::Start(BytesStart::new(name).with_attributes(attrs.iter().copied())),
    )
}

fn end(writer: &mut XmlWriter, name: &str) -> Result<(), DocxError> {
    emit(writer, Event::End(BytesEnd::new(name)))
}

fn empty(writer: &mut XmlWriter, name: &str, attrs: &[(&str, &str)]) -> Result<(), DocxError> {
    emit(
        writer,
        Event::Empty(BytesStart::new(name).with_attributes(attrs.iter().copied())),
    )
}

fn text_element(
    writer: &mut XmlWriter,
    name: &str,
    attrs: &[(&str, &str)],
    text: &str,
) -> Result<(), DocxError> {
    start(writer, name, attrs)?;
    emit(writer, Event::Text(BytesText::new(&xml_text(text))))?;
    end(writer, name)
}

/// Drops characters XML 1.0 cannot carry (C0 controls other than tab, LF and CR,
/// plus U+FFFE and U+FFFF). Escaping alone does not make them legal.
fn xml_text(text: &str) -> Cow<'_, str> {
    let legal = |c: char| {
        matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && !matches!(c, '\u{FFFE}' | '\u{FFFF}'))
    };
    if text.chars().all(legal) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|&c| legal(c)).collect())
    }
}

/// Runs `build` against a fresh writer that already holds the XML declaration.
fn xml_part<F>(build: F) -> Result<Vec<u8>, DocxError>
where
    F: FnOnce(&mut XmlWriter) -> Result<(), DocxError>,
{
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    emit(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))),
    )?;
    build(&mut writer)?;
    Ok(writer.into_inner().into_inner())
}

// ────────────────────────────────────────────────────────────────────────────
// Package parts
// ────────────────────────────────────────────────────────────────────────────

fn content_types_xml() -> Result<Vec<u8>, DocxError> {
    const OVERRIDES: [(&str, &str); 4] = [
        (
            "/word/document.xml",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml",
        ),
        (
            "/word/styles.xml",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml",
        ),
        (
            "/word/numbering.xml",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml",
        ),
        (
            "/docProps/core.xml",
            "application/vnd.openxmlformats-package.core-properties+xml",
        ),
    ];

    xml_part(|w| {
        start(w, "Types", &[("xmlns", CONTENT_TYPES_NS)])?;
        empty(
            w,
            "Default",
            &[
                ("Extension", "rels"),
                (
                    "ContentType",
                    "application/vnd.openxmlformats-package.relationships+xml",
                ),
            ],
        )?;
        empty(
            w,
            "Default",
            &[("Extension", "xml"), ("ContentType", "application/xml")],
        )?;
        for (part, content_type) in OVERRIDES {
            empty(
                w,
                "Override",
                &[("PartName", part), ("ContentType", content_type)],
            )?;
        }
        end(w, "Types")
    })
}

fn relationships_xml(rels: &[(&str, String, &str)]) -> Result<Vec<u8>, DocxError> {
    xml_part(|w| {
        start(w, "Relationships", &[("xmlns", PKG_REL_NS)])?;
        for (id, rel_type, target) in rels {
            empty(
                w,
                "Relationship",
                &[("Id", *id), ("Type", rel_type.as_str()), ("Target", *target)],
            )?;
        }
        end(w, "Relationships")
    })
}

fn package_rels_xml() -> Result<Vec<u8>, DocxError> {
    relationships_xml(&[
        (
            "rId1",
            format!("{OFFICE_REL}/officeDocument"),
            "word/document.xml",
        ),
        (
            "rId2",
            "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties"
                .to_string(),
            "docProps/core.xml",
        ),
    ])
}

fn document_rels_xml() -> Result<Vec<u8>, DocxError> {
    relationships_xml(&[
        ("rId1", format!("{OFFICE_REL}/styles"), "styles.xml"),
        ("rId2", format!("{OFFICE_REL}/numbering"), "numbering.xml"),
    ])
}

fn core_xml(title: &str) -> Result<Vec<u8>, DocxError> {
    let created = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    xml_part(|w| {
        start(
            w,
            "cp:coreProperties",
            &[
                (
                    "xmlns:cp",
                    "http://schemas.openxmlformats.org/package/2006/metadata/core-properties",
                ),
                ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
                ("xmlns:dcterms", "http://purl.org/dc/terms/"),
                ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
            ],
        )?;
        text_element(w, "dc:title", &[], title)?;
        text_element(w, "dc:creator", &[], env!("CARGO_PKG_NAME"))?;
        text_element(
            w,
            "dcterms:created",
            &[("xsi:type", "dcterms:W3CDTF")],
            &created,
        )?;
        end(w, "cp:coreProperties")
    })
}

fn run_fonts(w: &mut XmlWriter, style: &DocumentStyle) -> Result<(), DocxError> {
    let font = style.font_family.as_str();
    let size = (u32::from(style.font_size_pt) * 2).to_string();
    empty(
        w,
        "w:rFonts",
        &[
            ("w:ascii", font),
            ("w:hAnsi", font),
            ("w:eastAsia", font),
            ("w:cs", font),
        ],
    )?;
    empty(w, "w:sz", &[("w:val", &size)])?;
    empty(w, "w:szCs", &[("w:val", &size)])
}

fn styles_xml(style: &DocumentStyle) -> Result<Vec<u8>, DocxError> {
    xml_part(|w| {
        start(w, "w:styles", &[("xmlns:w", W_NS)])?;

        start(w, "w:docDefaults", &[])?;
        start(w, "w:rPrDefault", &[])?;
        start(w, "w:rPr", &[])?;
        run_fonts(w, style)?;
        end(w, "w:rPr")?;
        end(w, "w:rPrDefault")?;
        end(w, "w:docDefaults")?;

        start(
            w,
            "w:style",
            &[
                ("w:type", "paragraph"),
                ("w:default", "1"),
                ("w:styleId", "Normal"),
            ],
        )?;
        empty(w, "w:name", &[("w:val", "Normal")])?;
        empty(w, "w:qFormat", &[])?;
        start(w, "w:rPr", &[])?;
        run_fonts(w, style)?;
        end(w, "w:rPr")?;
        end(w, "w:style")?;

        for (index, size) in HEADING_SIZES.iter().enumerate() {
            let level = index + 1;
            let style_id = format!("Heading{level}");
            let name = format!("heading {level}");
            let outline = index.to_string();
            let size = size.to_string();

            start(
                w,
                "w:style",
                &[("w:type", "paragraph"), ("w:styleId", &style_id)],
            )?;
            empty(w, "w:name", &[("w:val", &name)])?;
            empty(w, "w:basedOn", &[("w:val", "Normal")])?;
            empty(w, "w:next", &[("w:val", "Normal")])?;
            empty(w, "w:qFormat", &[])?;
            start(w, "w:pPr", &[])?;
            empty(w, "w:keepNext", &[])?;
            empty(w, "w:spacing", &[("w:before", "240"), ("w:after", "80")])?;
            empty(w, "w:outlineLvl", &[("w:val", &outline)])?;
            end(w, "w:pPr")?;
            start(w, "w:rPr", &[])?;
            empty(w, "w:b", &[])?;
            empty(w, "w:sz", &[("w:val", &size)])?;
            empty(w, "w:szCs", &[("w:val", &size)])?;
            end(w, "w:rPr")?;
            end(w, "w:style")?;
        }

        start(
            w,
            "w:style",
            &[("w:type", "paragraph"), ("w:styleId", "ListBullet")],
        )?;
        empty(w, "w:name", &[("w:val", "List Bullet")])?;
        empty(w, "w:basedOn", &[("w:val", "Normal")])?;
        start(w, "w:pPr", &[])?;
        start(w, "w:numPr", &[])?;
        empty(w, "w:numId", &[("w:val", BULLET_NUM_ID)])?;
        end(w, "w:numPr")?;
        empty(w, "w:ind", &[("w:left", "360"), ("w:hanging", "360")])?;
        end(w, "w:pPr")?;
        end(w, "w:style")?;

        end(w, "w:styles")
    })
}

fn numbering_xml() -> Result<Vec<u8>, DocxError> {
    xml_part(|w| {
        start(w, "w:numbering", &[("xmlns:w", W_NS)])?;
        start(w, "w:abstractNum", &[("w:abstractNumId", "0")])?;
        empty(w, "w:multiLevelType", &[("w:val", "singleLevel")])?;
        start(w, "w:lvl", &[("w:ilvl", "0")])?;
        empty(w, "w:start", &[("w:val", "1")])?;
        empty(w, "w:numFmt", &[("w:val", "bullet")])?;
        empty(w, "w:lvlText", &[("w:val", "\u{2022}")])?;
        empty(w, "w:lvlJc", &[("w:val", "left")])?;
        start(w, "w:pPr", &[])?;
        empty(w, "w:ind", &[("w:left", "360"), ("w:hanging", "360")])?;
        end(w, "w:pPr")?;
        end(w, "w:lvl")?;
        end(w, "w:abstractNum")?;
        start(w, "w:num", &[("w:numId", BULLET_NUM_ID)])?;
        empty(w, "w:abstractNumId", &[("w:val", "0")])?;
        end(w, "w:num")?;
        end(w, "w:numbering")
    })
}

fn document_xml(blocks: &[Block]) -> Result<Vec<u8>, DocxError> {
    xml_part(|w| {
        start(w, "w:document", &[("xmlns:w", W_NS)])?;
        start(w, "w:body", &[])?;
        for block in blocks {
            write_block(w, block)?;
        }
        start(w, "w:sectPr", &[])?;
        empty(w, "w:pgSz", &[("w:w", PAGE_WIDTH), ("w:h", PAGE_HEIGHT)])?;
        empty(
            w,
            "w:pgMar",
            &[
                ("w:top", PAGE_MARGIN),
                ("w:right", PAGE_MARGIN),
                ("w:bottom", PAGE_MARGIN),
                ("w:left", PAGE_MARGIN),
                ("w:header", "720"),
                ("w:footer", "720"),
                ("w:gutter", "0"),
            ],
        )?;
        end(w, "w:sectPr")?;
        end(w, "w:body")?;
        end(w, "w:document")
    })
}

fn write_block(w: &mut XmlWriter, block: &Block) -> Result<(), DocxError> {
    match block {
        Block::Heading { level, text } => {
            let style_id = format!("Heading{}", (*level).clamp(1, 3));
            paragraph(w, Some(&style_id), true, text, false)
        }
        Block::BulletItem { text } => paragraph(w, Some("ListBullet"), false, text, false),
        Block::BoldLine { text } => paragraph(w, None, false, text, true),
        Block::Paragraph { text } => paragraph(w, None, false, text, false),
        Block::BlankSpacer => empty(w, "w:p", &[]),
    }
}

fn paragraph(
    w: &mut XmlWriter,
    style_id: Option<&str>,
    align_left: bool,
    text: &str,
    bold: bool,
) -> Result<(), DocxError> {
    start(w, "w:p", &[])?;
    if style_id.is_some() || align_left {
        start(w, "w:pPr", &[])?;
        if let Some(style_id) = style_id {
            empty(w, "w:pStyle", &[("w:val", style_id)])?;
        }
        if align_left {
            empty(w, "w:jc", &[("w:val", "left")])?;
        }
        end(w, "w:pPr")?;
    }
    let text = xml_text(text);
    if !text.is_empty() {
        start(w, "w:r", &[])?;
        if bold {
            start(w, "w:rPr", &[])?;
            empty(w, "w:b", &[])?;
            end(w, "w:rPr")?;
        }
        text_element(w, "w:t", &[("xml:space", "preserve")], &text)?;
        end(w, "w:r")?;
    }
    end(w, "w:p")
}
