use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The structured resume content the resume prompt asks the model for.
/// Every field defaults so a partially filled reply still renders.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeData {
    pub headline: String,
    pub summary: String,
    pub skills: Vec<String>,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<String>,
    pub certifications: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceEntry {
    pub role: String,
    pub company: String,
    pub location: String,
    pub dates: String,
    pub bullets: Vec<String>,
}

/// Which of the two per-session output slots a document belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Resume,
    CoverLetter,
}

impl DocumentKind {
    /// Suffix used in download file names: `<name>_<suffix>.md`.
    pub fn file_suffix(self) -> &'static str {
        match self {
            DocumentKind::Resume => "resume",
            DocumentKind::CoverLetter => "cover_letter",
        }
    }

    pub fn title_suffix(self) -> &'static str {
        match self {
            DocumentKind::Resume => "Resume",
            DocumentKind::CoverLetter => "Cover Letter",
        }
    }

    /// Parses the path segment used by the download routes.
    pub fn from_path_segment(segment: &str) -> Option<Self> {
        match segment {
            "resume" => Some(DocumentKind::Resume),
            "cover-letter" | "cover_letter" => Some(DocumentKind::CoverLetter),
            _ => None,
        }
    }
}

/// A finished generation. Replaced wholesale on regeneration, never edited in place.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedDocument {
    pub kind: DocumentKind,
    pub markdown: String,
    /// Candidate name the document was generated for; drives file names and titles.
    pub display_name: String,
    pub generated_at: DateTime<Utc>,
}

impl GeneratedDocument {
    pub fn new(kind: DocumentKind, markdown: String, display_name: &str) -> Self {
        Self {
            kind,
            markdown,
            display_name: display_name.to_string(),
            generated_at: Utc::now(),
        }
    }

    /// Title written into the document properties, e.g. `Amulya Goli – Resume`.
    pub fn title(&self) -> String {
        format!("{} – {}", self.display_name, self.kind.title_suffix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_data_tolerates_missing_fields() {
        let data: ResumeData = serde_json::from_str(
            r#"{"summary": "Coder", "experience": [{"role": "Analyst", "bullets": ["Did X"]}]}"#,
        )
        .unwrap();
        assert_eq!(data.summary, "Coder");
        assert!(data.skills.is_empty());
        assert_eq!(data.experience[0].role, "Analyst");
        assert!(data.experience[0].company.is_empty());
    }

    #[test]
    fn test_document_kind_suffixes() {
        assert_eq!(DocumentKind::Resume.file_suffix(), "resume");
        assert_eq!(DocumentKind::CoverLetter.file_suffix(), "cover_letter");
    }

    #[test]
    fn test_document_kind_path_segments() {
        assert_eq!(
            DocumentKind::from_path_segment("cover-letter"),
            Some(DocumentKind::CoverLetter)
        );
        assert_eq!(DocumentKind::from_path_segment("letter"), None);
    }

    #[test]
    fn test_generated_document_title() {
        let doc = GeneratedDocument::new(DocumentKind::CoverLetter, String::new(), "Amulya Goli");
        assert_eq!(doc.title(), "Amulya Goli – Cover Letter");
    }
}
