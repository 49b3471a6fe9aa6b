//! Text templates with `{variable}` placeholders, and the resume Markdown built on them.
//!
//! Syntax: `{name}` is replaced by the variable's value; `{{` and `}}` render literal
//! braces. Unknown variables and unclosed placeholders are errors, never silently kept.

use std::collections::HashMap;

use thiserror::Error;

use crate::models::profile::CandidateProfile;
use crate::models::resume::{ExperienceEntry, ResumeData};

/// Built-in resume template, used unless `RESUME_TEMPLATE_PATH` points elsewhere.
pub const DEFAULT_RESUME_TEMPLATE: &str = include_str!("../../templates/resume_template.md");

/// Variables every resume template may reference.
pub const RESUME_VARIABLES: [&str; 9] = [
    "name",
    "title",
    "contact_line",
    "headline",
    "summary",
    "skills",
    "experience",
    "education",
    "certifications",
];

#[derive(Debug, Error, PartialEq)]
pub enum TemplateError {
    #[error("unknown template variable '{0}'")]
    UnknownVariable(String),

    #[error("unclosed placeholder starting at byte {0}")]
    Unclosed(usize),

    #[error("invalid placeholder '{{{0}}}'")]
    InvalidPlaceholder(String),
}

/// Substitutes every `{name}` in `template` with `vars[name]`.
pub fn render_template(
    template: &str,
    vars: &HashMap<&str, String>,
) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut offset = 0;

    while let Some(pos) = rest.find(|c: char| c == '{' || c == '}') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if let Some(after) = tail.strip_prefix("{{") {
            out.push('{');
            offset += pos + 2;
            rest = after;
            continue;
        }
        if let Some(after) = tail.strip_prefix("}}") {
            out.push('}');
            offset += pos + 2;
            rest = after;
            continue;
        }
        if tail.starts_with('}') {
            out.push('}');
            offset += pos + 1;
            rest = &tail[1..];
            continue;
        }

        let close = tail.find('}').ok_or(TemplateError::Unclosed(offset + pos))?;
        let name = &tail[1..close];
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(TemplateError::InvalidPlaceholder(name.to_string()));
        }
        let value = vars
            .get(name)
            .ok_or_else(|| TemplateError::UnknownVariable(name.to_string()))?;
        out.push_str(value);

        offset += pos + close + 1;
        rest = &tail[close + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

/// Checks that `template` only references known resume variables.
/// Called at startup so a broken custom template fails before the first request.
pub fn validate_resume_template(template: &str) -> Result<(), TemplateError> {
    let vars: HashMap<&str, String> = RESUME_VARIABLES
        .iter()
        .map(|name| (*name, String::new()))
        .collect();
    render_template(template, &vars).map(|_| ())
}

// ────────────────────────────────────────────────────────────────────────────
// Resume rendering
// ────────────────────────────────────────────────────────────────────────────

/// Renders the model's structured resume plus the candidate's own details into Markdown.
///
/// List-valued fields are pre-formatted into the Markdown subset the document
/// renderer understands (`- ` bullets, `**Role, Company**` lines). Sections left
/// without content are removed afterwards.
pub fn render_resume_markdown(
    data: &ResumeData,
    profile: &CandidateProfile,
    template: &str,
) -> Result<String, TemplateError> {
    let headline = [data.headline.trim(), profile.title.trim()]
        .into_iter()
        .find(|s| !s.is_empty());

    let mut vars: HashMap<&str, String> = HashMap::new();
    vars.insert("name", profile.name.trim().to_string());
    vars.insert("title", profile.title.trim().to_string());
    vars.insert("contact_line", profile.contact_parts().join(" | "));
    vars.insert(
        "headline",
        headline.map(|h| format!("**{h}**")).unwrap_or_default(),
    );
    vars.insert("summary", data.summary.trim().to_string());
    vars.insert("skills", bullet_list(&data.skills));
    vars.insert(
        "experience",
        data.experience
            .iter()
            .map(experience_block)
            .filter(|block| !block.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n"),
    );
    vars.insert("education", bullet_list(&data.education));
    vars.insert("certifications", bullet_list(&data.certifications));

    let rendered = render_template(template, &vars)?;
    Ok(tidy_markdown(&rendered))
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(|item| format!("- {}", item.trim_start_matches("- ")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `**Role, Company**`, then `Location | Dates`, then one bullet per line.
fn experience_block(entry: &ExperienceEntry) -> String {
    let mut lines = Vec::new();

    let heading = [entry.role.trim(), entry.company.trim()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    if !heading.is_empty() {
        lines.push(format!("**{heading}**"));
    }

    let meta = [entry.location.trim(), entry.dates.trim()]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" | ");
    if !meta.is_empty() {
        lines.push(meta);
    }

    let bullets = bullet_list(&entry.bullets);
    if !bullets.is_empty() {
        lines.push(bullets);
    }

    lines.join("\n")
}

/// Drops `##` sections with no content, collapses blank-line runs, and trims the ends.
fn tidy_markdown(markdown: &str) -> String {
    let lines: Vec<&str> = markdown.lines().map(str::trim_end).collect();
    let mut kept: Vec<&str> = Vec::with_capacity(lines.len());

    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if line.starts_with("## ") {
            let section_end = lines[i + 1..]
                .iter()
                .position(|l| l.starts_with("# ") || l.starts_with("## "))
                .map_or(lines.len(), |p| i + 1 + p);
            if lines[i + 1..section_end].iter().all(|l| l.is_empty()) {
                i = section_end;
                continue;
            }
        }
        if !(line.is_empty() && kept.last().is_some_and(|l| l.is_empty())) {
            kept.push(line);
        }
        i += 1;
    }

    let text = kept.join("\n");
    let text = text.trim_matches('\n');
    format!("{text}\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&'static str, &str)]) -> HashMap<&'static str, String> {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    fn profile() -> CandidateProfile {
        CandidateProfile {
            name: "Amulya Goli".to_string(),
            title: "Revenue Cycle Analyst".to_string(),
            location: "Aurora, IL".to_string(),
            email: "amulyagoli@example.com".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_render_template_substitutes_variables() {
        let out = render_template("Hi {name}, {name}!", &vars(&[("name", "Ada")])).unwrap();
        assert_eq!(out, "Hi Ada, Ada!");
    }

    #[test]
    fn test_render_template_escapes_braces() {
        let out = render_template("{{literal}} {x}", &vars(&[("x", "1")])).unwrap();
        assert_eq!(out, "{literal} 1");
    }

    #[test]
    fn test_render_template_unknown_variable() {
        let err = render_template("{missing}", &vars(&[])).unwrap_err();
        assert_eq!(err, TemplateError::UnknownVariable("missing".to_string()));
    }

    #[test]
    fn test_render_template_unclosed_placeholder() {
        let err = render_template("ok {name", &vars(&[("name", "x")])).unwrap_err();
        assert_eq!(err, TemplateError::Unclosed(3));
    }

    #[test]
    fn test_render_template_rejects_non_identifier_placeholder() {
        let err = render_template("{not valid}", &vars(&[])).unwrap_err();
        assert!(matches!(err, TemplateError::InvalidPlaceholder(_)));
    }

    #[test]
    fn test_default_template_is_valid() {
        assert!(validate_resume_template(DEFAULT_RESUME_TEMPLATE).is_ok());
    }

    #[test]
    fn test_render_resume_markdown_full() {
        let data = ResumeData {
            headline: "Medical Coding Specialist".to_string(),
            summary: "Coder with 5 years of experience.".to_string(),
            skills: vec!["ICD-10-CM".to_string(), "CPT/HCPCS".to_string()],
            experience: vec![ExperienceEntry {
                role: "Claims Analyst".to_string(),
                company: "Acme Health".to_string(),
                location: "Chicago, IL".to_string(),
                dates: "2021 – Present".to_string(),
                bullets: vec!["Reduced AR >90 by 22%".to_string()],
            }],
            education: vec!["MBA in Healthcare Informatics".to_string()],
            certifications: vec![],
        };

        let md = render_resume_markdown(&data, &profile(), DEFAULT_RESUME_TEMPLATE).unwrap();

        assert!(md.starts_with("# Amulya Goli\nAurora, IL | amulyagoli@example.com\n"));
        assert!(md.contains("**Medical Coding Specialist**"));
        assert!(md.contains("## Core Skills\n- ICD-10-CM\n- CPT/HCPCS"));
        assert!(md.contains(
            "**Claims Analyst, Acme Health**\nChicago, IL | 2021 – Present\n- Reduced AR >90 by 22%"
        ));
        assert!(!md.contains("## Certifications"), "empty section must be dropped");
        assert!(!md.contains("\n\n\n"));
        assert!(md.ends_with('\n'));
    }

    #[test]
    fn test_headline_falls_back_to_profile_title() {
        let md = render_resume_markdown(&ResumeData::default(), &profile(), DEFAULT_RESUME_TEMPLATE)
            .unwrap();
        assert!(md.contains("**Revenue Cycle Analyst**"));
        assert!(!md.contains("## Summary"));
    }

    #[test]
    fn test_bullet_list_does_not_double_prefix() {
        let items = vec!["- already a bullet".to_string(), "  ".to_string()];
        assert_eq!(bullet_list(&items), "- already a bullet");
    }

    #[test]
    fn test_tidy_markdown_keeps_non_empty_sections() {
        let out = tidy_markdown("# A\n\n\n## Empty\n\n## Full\ntext\n\n\n");
        assert_eq!(out, "# A\n\n## Full\ntext\n");
    }
}
