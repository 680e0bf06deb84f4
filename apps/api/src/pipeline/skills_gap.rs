//! Skills-gap analysis. Advisory stage: a failure here degrades the overall
//! report (the gap section comes back as None) instead of failing it.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{ChatParams, LlmClient};

use super::job_analysis::JobAnalysis;
use super::prompts::SKILLS_GAP_PROMPT;
use super::resume_parser::CandidateProfile;
use super::scoring::MatchAnalysis;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GapImportance {
    Critical,
    Important,
    #[serde(rename = "Nice-to-have")]
    NiceToHave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Readiness {
    #[serde(rename = "Ready to apply")]
    ReadyToApply,
    #[serde(rename = "Need 1-2 skills")]
    NeedFewSkills,
    #[serde(rename = "Need significant upskilling")]
    NeedSignificantUpskilling,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillGapItem {
    pub skill: String,
    pub importance: GapImportance,
    #[serde(default)]
    pub learning_resources: Vec<String>,
    #[serde(default)]
    pub estimated_learning_time: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillsGap {
    #[serde(default)]
    pub gaps: Vec<SkillGapItem>,
    #[serde(default)]
    pub existing_strengths: Vec<String>,
    #[serde(default)]
    pub quick_wins: Vec<String>,
    #[serde(default)]
    pub long_term_development: Vec<String>,
    pub readiness: Readiness,
    #[serde(default)]
    pub summary: String,
}

/// Produces the upskilling plan for the candidate against this role.
/// Returns None on any failure; the caller treats the section as optional.
pub async fn analyze_skills_gap(
    llm: &LlmClient,
    profile: &CandidateProfile,
    job: &JobAnalysis,
    match_analysis: &MatchAnalysis,
) -> Option<SkillsGap> {
    let prompt = SKILLS_GAP_PROMPT
        .replace(
            "{candidate_skills}",
            &serde_json::to_string(&profile.skills).unwrap_or_default(),
        )
        .replace(
            "{job_analysis}",
            &serde_json::to_string_pretty(job).unwrap_or_default(),
        )
        .replace(
            "{missing_skills}",
            &serde_json::to_string(&match_analysis.skills_match.missing_skills)
                .unwrap_or_default(),
        );
    let params = ChatParams {
        json_mode: true,
        ..ChatParams::default()
    };

    match llm.call_json::<SkillsGap>(&prompt, JSON_ONLY_SYSTEM, &params).await {
        Ok(gap) => {
            info!(
                "Skills gap: {} gaps, readiness {:?}",
                gap.gaps.len(),
                gap.readiness
            );
            Some(gap)
        }
        Err(e) => {
            warn!("Skills gap analysis failed, omitting section: {e}");
            None
        }
    }
}
