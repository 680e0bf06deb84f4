//! Job requirement analysis. Distils a drive's job description into the
//! structured requirement sets the scoring stages consume. Recomputed per
//! request; job descriptions are small and the call is cheap relative to the
//! staleness bugs a cache would invite.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{ChatParams, LlmClient};

use super::prompts::JOB_ANALYSIS_PROMPT;
use super::StageError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobAnalysis {
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub preferred_skills: Vec<String>,
    #[serde(default)]
    pub experience_level: String,
    #[serde(default)]
    pub key_responsibilities: Vec<String>,
    #[serde(default)]
    pub must_have_keywords: Vec<String>,
    #[serde(default)]
    pub nice_to_have_keywords: Vec<String>,
}

impl JobAnalysis {
    /// The keyword universe the ATS stage screens against: required skills,
    /// preferred skills, and must-have keywords, deduplicated while keeping
    /// first-seen order.
    pub fn ats_keywords(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.required_skills
            .iter()
            .chain(self.preferred_skills.iter())
            .chain(self.must_have_keywords.iter())
            .filter(|k| seen.insert(k.to_lowercase()))
            .cloned()
            .collect()
    }
}

fn build_prompt(job_title: &str, job_description: &str, hints: Option<&Value>) -> String {
    let hints_text = hints
        .and_then(|h| serde_json::to_string_pretty(h).ok())
        .unwrap_or_else(|| "none".to_string());
    JOB_ANALYSIS_PROMPT
        .replace("{job_title}", job_title)
        .replace("{job_description}", job_description)
        .replace("{job_requirements}", &hints_text)
}

/// Analyzes a job description into structured requirements. `hints` carries
/// whatever structured requirements the drive already has on record.
pub async fn analyze_job(
    llm: &LlmClient,
    job_title: &str,
    job_description: &str,
    hints: Option<&Value>,
) -> Result<JobAnalysis, StageError> {
    let prompt = build_prompt(job_title, job_description, hints);
    let params = ChatParams {
        json_mode: true,
        ..ChatParams::default()
    };

    let analysis: JobAnalysis = llm
        .call_json(&prompt, JSON_ONLY_SYSTEM, &params)
        .await
        .map_err(|e| {
            warn!("Job analysis failed for '{job_title}': {e}");
            StageError::JobAnalysisFailed
        })?;

    info!(
        "Analyzed job '{}': {} required skills, {} keywords",
        job_title,
        analysis.required_skills.len(),
        analysis.must_have_keywords.len()
    );
    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_analysis() -> JobAnalysis {
        JobAnalysis {
            required_skills: vec!["Rust".to_string(), "SQL".to_string()],
            preferred_skills: vec!["Docker".to_string(), "rust".to_string()],
            experience_level: "Entry level".to_string(),
            key_responsibilities: vec!["Build APIs".to_string()],
            must_have_keywords: vec!["REST".to_string(), "SQL".to_string()],
            nice_to_have_keywords: vec!["gRPC".to_string()],
        }
    }

    #[test]
    fn test_ats_keywords_dedupes_case_insensitively() {
        let keywords = make_analysis().ats_keywords();
        // "rust" and the second "SQL" are dropped; first-seen order kept.
        assert_eq!(keywords, vec!["Rust", "SQL", "Docker", "REST"]);
    }

    #[test]
    fn test_ats_keywords_excludes_nice_to_have() {
        let keywords = make_analysis().ats_keywords();
        assert!(!keywords.iter().any(|k| k == "gRPC"));
    }

    #[test]
    fn test_prompt_includes_structured_hints_when_present() {
        let hints = serde_json::json!({"min_cgpa": 7.5, "batch": "2026"});
        let prompt = build_prompt("SDE I", "Build backend services.", Some(&hints));
        assert!(prompt.contains("min_cgpa"));
        assert!(prompt.contains("2026"));
    }

    #[test]
    fn test_prompt_marks_absent_hints() {
        let prompt = build_prompt("SDE I", "Build backend services.", None);
        assert!(prompt.contains("Additional structured requirements"));
        assert!(!prompt.contains("{job_requirements}"));
    }

    #[test]
    fn test_sparse_response_deserializes() {
        let analysis: JobAnalysis =
            serde_json::from_str(r#"{"required_skills": ["Python"]}"#).unwrap();
        assert_eq!(analysis.required_skills, vec!["Python"]);
        assert!(analysis.experience_level.is_empty());
    }
}
