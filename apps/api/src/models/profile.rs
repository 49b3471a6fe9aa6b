use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Candidate details collected from the form. Free-text fields are passed to the
/// prompt verbatim; only `name` is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateProfile {
    pub name: String,
    pub title: String,
    pub location: String,
    pub email: String,
    pub phone: String,
    pub linkedin: String,
    pub portfolio: String,
    /// Comma-separated, as typed.
    pub skills: String,
    pub experience: String,
    pub education: String,
}

impl CandidateProfile {
    pub fn validate(&self) -> Result<(), AppError> {
        require("profile.name", &self.name)
    }

    /// Non-empty contact fields in display order.
    pub fn contact_parts(&self) -> Vec<&str> {
        [
            &self.location,
            &self.email,
            &self.phone,
            &self.linkedin,
            &self.portfolio,
        ]
        .into_iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect()
    }
}

/// The target role.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobDescription {
    pub title: String,
    pub company: String,
    pub summary: String,
    pub requirements: String,
}

impl JobDescription {
    pub fn validate(&self) -> Result<(), AppError> {
        require("job.title", &self.title)?;
        require("job.company", &self.company)
    }
}

fn require(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}
