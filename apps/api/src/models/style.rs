use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Seniority level the documents should be pitched at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Seniority {
    Entry,
    Junior,
    Mid,
    #[default]
    MidSenior,
    Senior,
    Lead,
}

impl fmt::Display for Seniority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Seniority::Entry => "entry",
            Seniority::Junior => "junior",
            Seniority::Mid => "mid",
            Seniority::MidSenior => "mid-senior",
            Seniority::Senior => "senior",
            Seniority::Lead => "lead",
        })
    }
}

/// Resume layout preference passed through to the prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layout {
    #[default]
    #[serde(rename = "modern ATS-friendly")]
    ModernAts,
    #[serde(rename = "classic")]
    Classic,
    #[serde(rename = "two-column (ATS-safe)")]
    TwoColumn,
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Layout::ModernAts => "modern ATS-friendly",
            Layout::Classic => "classic",
            Layout::TwoColumn => "two-column (ATS-safe)",
        })
    }
}

/// Tone, seniority, and layout preferences. Immutable once built; passed by value
/// into the prompt builders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub tone: String,
    pub seniority: Seniority,
    pub layout: Layout,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            tone: "professional, confident".to_string(),
            seniority: Seniority::default(),
            layout: Layout::default(),
        }
    }
}

impl StyleConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.tone.trim().is_empty() {
            return Err(AppError::Validation("style.tone cannot be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_form_defaults() {
        let style = StyleConfig::default();
        assert_eq!(style.tone, "professional, confident");
        assert_eq!(style.seniority, Seniority::MidSenior);
        assert_eq!(style.layout, Layout::ModernAts);
    }

    #[test]
    fn test_deserializes_form_values() {
        let style: StyleConfig = serde_json::from_str(
            r#"{"tone": "warm", "seniority": "mid-senior", "layout": "two-column (ATS-safe)"}"#,
        )
        .unwrap();
        assert_eq!(style.seniority, Seniority::MidSenior);
        assert_eq!(style.layout, Layout::TwoColumn);
    }

    #[test]
    fn test_unknown_seniority_is_rejected() {
        let result = serde_json::from_str::<StyleConfig>(r#"{"seniority": "intern"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_display_matches_wire_names() {
        for seniority in [Seniority::Entry, Seniority::MidSenior, Seniority::Lead] {
            let wire = serde_json::to_value(seniority).unwrap();
            assert_eq!(wire, seniority.to_string());
        }
        let wire = serde_json::to_value(Layout::TwoColumn).unwrap();
        assert_eq!(wire, Layout::TwoColumn.to_string());
    }

    #[test]
    fn test_blank_tone_fails_validation() {
        let style = StyleConfig {
            tone: String::new(),
            ..Default::default()
        };
        assert!(style.validate().is_err());
    }
}
