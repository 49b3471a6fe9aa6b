//! Prompt templates for the two document types and the builders that fill them.
//!
//! Builders are pure: identical inputs always give the identical prompt string.

use crate::models::profile::{CandidateProfile, JobDescription};
use crate::models::style::StyleConfig;

/// Max characters of the current resume passed into the cover-letter prompt.
pub const RESUME_HIGHLIGHTS_CHARS: usize = 2000;

/// Resume prompt. Replace: {candidate_block}, {job_block}, {style_block}, {existing_block}
pub const RESUME_PROMPT_TEMPLATE: &str = r#"You are an expert resume writer and ATS optimization specialist.
Write a resume for the candidate below, tailored to the target job.

CANDIDATE
{candidate_block}

TARGET JOB
{job_block}

STYLE
{style_block}
{existing_block}
Return a JSON object with this EXACT schema (no extra fields, no commentary):
{
  "headline": "One-line professional headline aligned to the target title",
  "summary": "3-4 sentence professional summary",
  "skills": ["skill", "skill"],
  "experience": [
    {
      "role": "Job title",
      "company": "Employer",
      "location": "City, State",
      "dates": "Start – End",
      "bullets": ["Action verb + task + measurable result"]
    }
  ],
  "education": ["Degree, Institution"],
  "certifications": ["Certification"]
}

HARD RULES:
1. Use ONLY facts present in the candidate details or existing resume — never invent employers, dates, degrees, or metrics
2. Mirror the job's requirement keywords where the candidate genuinely has them
3. 3-6 bullets per role, each starting with a strong action verb, quantified where the source has numbers
4. Match the requested tone and pitch the language at the requested seniority
5. Keep every field plain text — no Markdown inside JSON values"#;

/// Cover-letter prompt. Replace: {candidate_block}, {job_block}, {style_block}, {highlights_block}
pub const COVER_LETTER_PROMPT_TEMPLATE: &str = r#"You are an expert career coach writing a tailored cover letter.

CANDIDATE
{candidate_block}

TARGET JOB
{job_block}

STYLE
{style_block}
{highlights_block}
Write a 250-350 word cover letter in Markdown.

FORMAT RULES (the letter is converted to a Word document line by line):
- Start with the candidate's name as a `# ` heading, then one line of contact details
- Use plain paragraphs separated by one blank line
- Use `- ` bullets only for 2-3 key achievements, if any
- Use `**bold**` only for whole lines, never inside a sentence
- No tables, links, code blocks, or nested lists

CONTENT RULES:
1. Open with the exact job title and company
2. Connect the candidate's strongest evidence to the top requirements
3. Use ONLY facts from the candidate details and resume highlights
4. Close with a confident call to action and the candidate's name"#;

/// Builds the structured-output prompt for a tailored resume.
pub fn build_resume_prompt(
    profile: &CandidateProfile,
    job: &JobDescription,
    style: &StyleConfig,
    existing_resume: Option<&str>,
) -> String {
    let existing_block = match existing_resume.map(str::trim).filter(|s| !s.is_empty()) {
        Some(text) => format!("\nEXISTING RESUME (enrich from this; do not copy blindly)\n{text}\n"),
        None => String::new(),
    };

    RESUME_PROMPT_TEMPLATE
        .replace("{candidate_block}", &candidate_block(profile))
        .replace("{job_block}", &job_block(job))
        .replace("{style_block}", &style_block(style))
        .replace("{existing_block}", &existing_block)
}

/// Builds the Markdown prompt for a tailored cover letter.
pub fn build_cover_letter_prompt(
    profile: &CandidateProfile,
    job: &JobDescription,
    style: &StyleConfig,
    resume_highlights: Option<&str>,
) -> String {
    let highlights_block = match resume_highlights.map(str::trim).filter(|s| !s.is_empty()) {
        Some(text) => format!("\nRESUME HIGHLIGHTS\n{text}\n"),
        None => String::new(),
    };

    COVER_LETTER_PROMPT_TEMPLATE
        .replace("{candidate_block}", &candidate_block(profile))
        .replace("{job_block}", &job_block(job))
        .replace("{style_block}", &style_block(style))
        .replace("{highlights_block}", &highlights_block)
}

/// The first `RESUME_HIGHLIGHTS_CHARS` characters of a resume, cut on a char boundary.
pub fn resume_highlights(markdown: &str) -> &str {
    match markdown.char_indices().nth(RESUME_HIGHLIGHTS_CHARS) {
        Some((idx, _)) => &markdown[..idx],
        None => markdown,
    }
}

fn candidate_block(profile: &CandidateProfile) -> String {
    [
        ("Name", &profile.name),
        ("Target title", &profile.title),
        ("Location", &profile.location),
        ("Email", &profile.email),
        ("Phone", &profile.phone),
        ("LinkedIn", &profile.linkedin),
        ("Portfolio", &profile.portfolio),
        ("Core skills", &profile.skills),
        ("Experience", &profile.experience),
        ("Education & certifications", &profile.education),
    ]
    .iter()
    .map(|(label, value)| format!("{label}: {}", value.trim()))
    .collect::<Vec<_>>()
    .join("\n")
}

fn job_block(job: &JobDescription) -> String {
    format!(
        "Title: {}\nCompany: {}\nSummary: {}\nTop requirements: {}",
        job.title.trim(),
        job.company.trim(),
        job.summary.trim(),
        job.requirements.trim()
    )
}

fn style_block(style: &StyleConfig) -> String {
    format!(
        "Tone: {}\nSeniority: {}\nLayout: {}",
        style.tone.trim(),
        style.seniority,
        style.layout
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::style::Seniority;

    fn profile() -> CandidateProfile {
        CandidateProfile {
            name: "Amulya Goli".to_string(),
            skills: "ICD-10-CM, CPT/HCPCS".to_string(),
            ..Default::default()
        }
    }

    fn job() -> JobDescription {
        JobDescription {
            title: "Claims Coding Specialist".to_string(),
            company: "UChicago Medicine".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_resume_prompt_is_deterministic() {
        let style = StyleConfig::default();
        let a = build_resume_prompt(&profile(), &job(), &style, Some("old resume"));
        let b = build_resume_prompt(&profile(), &job(), &style, Some("old resume"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_resume_prompt_fills_every_placeholder() {
        let prompt = build_resume_prompt(&profile(), &job(), &StyleConfig::default(), None);
        for placeholder in ["{candidate_block}", "{job_block}", "{style_block}", "{existing_block}"] {
            assert!(!prompt.contains(placeholder), "{placeholder} left in prompt");
        }
        assert!(prompt.contains("Name: Amulya Goli"));
        assert!(prompt.contains("Company: UChicago Medicine"));
        assert!(prompt.contains("Seniority: mid-senior"));
        assert!(prompt.contains("\"experience\""));
    }

    #[test]
    fn test_resume_prompt_includes_existing_resume_only_when_present() {
        let style = StyleConfig::default();
        let with = build_resume_prompt(&profile(), &job(), &style, Some("Prior role at Acme"));
        let without = build_resume_prompt(&profile(), &job(), &style, Some("   "));
        assert!(with.contains("EXISTING RESUME"));
        assert!(with.contains("Prior role at Acme"));
        assert!(!without.contains("EXISTING RESUME"));
    }

    #[test]
    fn test_cover_letter_prompt_uses_style_and_highlights() {
        let style = StyleConfig {
            tone: "warm, concise".to_string(),
            seniority: Seniority::Senior,
            ..Default::default()
        };
        let prompt = build_cover_letter_prompt(&profile(), &job(), &style, Some("# Amulya Goli"));
        assert!(prompt.contains("Tone: warm, concise"));
        assert!(prompt.contains("Seniority: senior"));
        assert!(prompt.contains("RESUME HIGHLIGHTS\n# Amulya Goli"));
        assert!(!prompt.contains("{highlights_block}"));
    }

    #[test]
    fn test_resume_highlights_truncates_on_char_boundary() {
        let long = "é".repeat(RESUME_HIGHLIGHTS_CHARS + 10);
        let cut = resume_highlights(&long);
        assert_eq!(cut.chars().count(), RESUME_HIGHLIGHTS_CHARS);
        assert_eq!(resume_highlights("short"), "short");
    }
}
