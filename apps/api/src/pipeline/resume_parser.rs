//! Resume parsing. Sends extracted resume text to the model and deserializes
//! the structured candidate profile. Fails closed: if the model output cannot
//! be parsed, the whole analysis is rejected rather than scored against a
//! half-empty profile.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{ChatParams, LlmClient};

use super::prompts::PARSE_RESUME_PROMPT;
use super::StageError;

/// Sentinel used for scalar fields the resume does not mention. Kept as a
/// string (not None) so downstream prompts always have something to quote.
pub const NOT_MENTIONED: &str = "Not mentioned";

fn not_mentioned() -> String {
    NOT_MENTIONED.to_string()
}

/// Structured candidate profile extracted from resume text.
///
/// Every scalar defaults to the "Not mentioned" sentinel and every list to
/// empty, so a model response that omits fields still deserializes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateProfile {
    #[serde(default = "not_mentioned")]
    pub name: String,
    #[serde(default = "not_mentioned")]
    pub email: String,
    #[serde(default = "not_mentioned")]
    pub phone: String,
    #[serde(default = "not_mentioned")]
    pub location: String,
    #[serde(default = "not_mentioned")]
    pub summary: String,
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub projects: Vec<ProjectEntry>,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub achievements: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EducationEntry {
    #[serde(default = "not_mentioned")]
    pub degree: String,
    #[serde(default = "not_mentioned")]
    pub institution: String,
    #[serde(default = "not_mentioned")]
    pub year: String,
    #[serde(default = "not_mentioned")]
    pub cgpa: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceEntry {
    #[serde(default = "not_mentioned")]
    pub title: String,
    #[serde(default = "not_mentioned")]
    pub company: String,
    #[serde(default = "not_mentioned")]
    pub duration: String,
    #[serde(default = "not_mentioned")]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectEntry {
    #[serde(default = "not_mentioned")]
    pub name: String,
    #[serde(default = "not_mentioned")]
    pub description: String,
    #[serde(default)]
    pub technologies: Vec<String>,
}

/// Parses resume text into a structured profile via the model.
pub async fn parse_resume(
    llm: &LlmClient,
    resume_text: &str,
) -> Result<CandidateProfile, StageError> {
    let prompt = PARSE_RESUME_PROMPT.replace("{resume_text}", resume_text);
    let params = ChatParams {
        json_mode: true,
        ..ChatParams::default()
    };

    let profile: CandidateProfile = llm
        .call_json(&prompt, JSON_ONLY_SYSTEM, &params)
        .await
        .map_err(|e| {
            warn!("Resume parsing failed: {e}");
            StageError::ResumeUnparseable
        })?;

    info!(
        "Parsed resume: {} skills, {} experience entries, {} projects",
        profile.skills.len(),
        profile.experience.len(),
        profile.projects.len()
    );
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_response_fills_sentinels() {
        let json = r#"{"name": "Asha Rao", "skills": ["Rust", "SQL"]}"#;
        let profile: CandidateProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.name, "Asha Rao");
        assert_eq!(profile.email, NOT_MENTIONED);
        assert_eq!(profile.skills, vec!["Rust", "SQL"]);
        assert!(profile.experience.is_empty());
        assert!(profile.certifications.is_empty());
    }

    #[test]
    fn test_nested_entries_deserialize_with_defaults() {
        let json = r#"{
            "experience": [{"title": "Intern", "company": "Acme"}],
            "projects": [{"name": "Crawler"}]
        }"#;
        let profile: CandidateProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.experience[0].title, "Intern");
        assert_eq!(profile.experience[0].duration, NOT_MENTIONED);
        assert_eq!(profile.projects[0].name, "Crawler");
        assert!(profile.projects[0].technologies.is_empty());
    }
}
