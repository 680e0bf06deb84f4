//! Fit and ATS scoring. Two model calls, an overall candidate/role match and
//! an ATS keyword screen, each followed by a pure normalization pass that
//! clamps scores and reconciles the model's skill lists against what the
//! candidate and the job actually contain. The normalizers are where the
//! guarantees live; the model output is treated as a proposal.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{info, warn};

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{ChatParams, LlmClient};

use super::job_analysis::JobAnalysis;
use super::prompts::{ATS_SCORE_PROMPT, MATCH_ANALYSIS_PROMPT};
use super::resume_parser::CandidateProfile;
use super::StageError;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SkillsMatch {
    #[serde(default)]
    pub matching_skills: Vec<String>,
    #[serde(default)]
    pub missing_skills: Vec<String>,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExperienceFit {
    #[serde(default)]
    pub assessment: String,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CulturalFit {
    #[serde(default)]
    pub assessment: String,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MatchAnalysis {
    #[serde(default)]
    pub overall_match_score: f64,
    #[serde(default)]
    pub skills_match: SkillsMatch,
    #[serde(default)]
    pub experience_fit: ExperienceFit,
    #[serde(default)]
    pub cultural_fit: CulturalFit,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub improvement_areas: Vec<String>,
    #[serde(default)]
    pub recommendation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AtsAnalysis {
    #[serde(default)]
    pub ats_score: f64,
    #[serde(default)]
    pub keyword_match_percentage: f64,
    #[serde(default)]
    pub matched_keywords: Vec<String>,
    #[serde(default)]
    pub missing_keywords: Vec<String>,
    #[serde(default)]
    pub formatting_issues: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub overall_assessment: String,
}

fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, 100.0)
}

/// Enforces the invariants the match report promises its consumers:
/// scores in 0..=100, both skill lists drawn only from skills that exist on
/// either side, and matching/missing disjoint (matching wins ties).
pub fn normalize_match_analysis(
    mut analysis: MatchAnalysis,
    profile: &CandidateProfile,
    job: &JobAnalysis,
) -> MatchAnalysis {
    analysis.overall_match_score = clamp_score(analysis.overall_match_score);
    analysis.skills_match.score = clamp_score(analysis.skills_match.score);
    analysis.experience_fit.score = clamp_score(analysis.experience_fit.score);
    analysis.cultural_fit.score = clamp_score(analysis.cultural_fit.score);

    let known: HashSet<String> = profile
        .skills
        .iter()
        .chain(job.required_skills.iter())
        .chain(job.preferred_skills.iter())
        .map(|s| s.to_lowercase())
        .collect();

    analysis
        .skills_match
        .matching_skills
        .retain(|s| known.contains(&s.to_lowercase()));

    let matching: HashSet<String> = analysis
        .skills_match
        .matching_skills
        .iter()
        .map(|s| s.to_lowercase())
        .collect();
    analysis
        .skills_match
        .missing_skills
        .retain(|s| known.contains(&s.to_lowercase()) && !matching.contains(&s.to_lowercase()));

    analysis
}

/// Reconciles the ATS report against the keyword universe derived from the
/// job analysis: matched keywords must come from that universe (kept in the
/// universe's order), missing is exactly the complement, and the percentage
/// is recomputed instead of trusted.
pub fn normalize_ats(mut analysis: AtsAnalysis, keywords: &[String]) -> AtsAnalysis {
    analysis.ats_score = clamp_score(analysis.ats_score);

    let reported: HashSet<String> = analysis
        .matched_keywords
        .iter()
        .map(|k| k.to_lowercase())
        .collect();

    let mut seen = HashSet::new();
    analysis.matched_keywords = keywords
        .iter()
        .filter(|k| seen.insert(k.to_lowercase()) && reported.contains(&k.to_lowercase()))
        .cloned()
        .collect();

    let matched: HashSet<String> = analysis
        .matched_keywords
        .iter()
        .map(|k| k.to_lowercase())
        .collect();
    let mut seen = HashSet::new();
    analysis.missing_keywords = keywords
        .iter()
        .filter(|k| seen.insert(k.to_lowercase()) && !matched.contains(&k.to_lowercase()))
        .cloned()
        .collect();

    let universe = analysis.matched_keywords.len() + analysis.missing_keywords.len();
    analysis.keyword_match_percentage = if universe == 0 {
        0.0
    } else {
        (analysis.matched_keywords.len() as f64 / universe as f64 * 100.0).round()
    };

    analysis
}

/// Scores the candidate/role match.
pub async fn score_match(
    llm: &LlmClient,
    profile: &CandidateProfile,
    job: &JobAnalysis,
    company_context: &str,
) -> Result<MatchAnalysis, StageError> {
    let prompt = MATCH_ANALYSIS_PROMPT
        .replace(
            "{candidate_profile}",
            &serde_json::to_string_pretty(profile).unwrap_or_default(),
        )
        .replace(
            "{job_analysis}",
            &serde_json::to_string_pretty(job).unwrap_or_default(),
        )
        .replace("{company_context}", company_context);
    let params = ChatParams {
        json_mode: true,
        ..ChatParams::default()
    };

    let analysis: MatchAnalysis = llm
        .call_json(&prompt, JSON_ONLY_SYSTEM, &params)
        .await
        .map_err(|e| {
            warn!("Match scoring failed: {e}");
            StageError::ScoringFailed
        })?;

    let analysis = normalize_match_analysis(analysis, profile, job);
    info!(
        "Match scored: overall={}, skills={}",
        analysis.overall_match_score, analysis.skills_match.score
    );
    Ok(analysis)
}

/// Runs the ATS keyword screen of the resume text against the job's keywords.
pub async fn score_ats(
    llm: &LlmClient,
    resume_text: &str,
    job: &JobAnalysis,
) -> Result<AtsAnalysis, StageError> {
    let keywords = job.ats_keywords();
    let prompt = ATS_SCORE_PROMPT
        .replace("{resume_text}", resume_text)
        .replace("{keywords}", &keywords.join(", "));
    let params = ChatParams {
        json_mode: true,
        ..ChatParams::default()
    };

    let analysis: AtsAnalysis = llm
        .call_json(&prompt, JSON_ONLY_SYSTEM, &params)
        .await
        .map_err(|e| {
            warn!("ATS scoring failed: {e}");
            StageError::ScoringFailed
        })?;

    let analysis = normalize_ats(analysis, &keywords);
    info!(
        "ATS scored: score={}, matched {}/{} keywords",
        analysis.ats_score,
        analysis.matched_keywords.len(),
        keywords.len()
    );
    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_profile() -> CandidateProfile {
        serde_json::from_value(serde_json::json!({
            "name": "Asha Rao",
            "skills": ["Rust", "SQL", "Git"]
        }))
        .unwrap()
    }

    fn make_job() -> JobAnalysis {
        JobAnalysis {
            required_skills: vec!["Rust".to_string(), "Kubernetes".to_string()],
            preferred_skills: vec!["Docker".to_string()],
            experience_level: String::new(),
            key_responsibilities: Vec::new(),
            must_have_keywords: vec!["REST".to_string()],
            nice_to_have_keywords: Vec::new(),
        }
    }

    #[test]
    fn test_normalize_match_clamps_scores() {
        let analysis = MatchAnalysis {
            overall_match_score: 150.0,
            skills_match: SkillsMatch {
                score: -10.0,
                ..SkillsMatch::default()
            },
            cultural_fit: CulturalFit {
                assessment: "Great fit".to_string(),
                score: 120.0,
            },
            ..MatchAnalysis::default()
        };
        let out = normalize_match_analysis(analysis, &make_profile(), &make_job());
        assert_eq!(out.overall_match_score, 100.0);
        assert_eq!(out.skills_match.score, 0.0);
        assert_eq!(out.cultural_fit.score, 100.0);
    }

    #[test]
    fn test_match_analysis_accepts_cultural_fit_object() {
        let json = serde_json::json!({
            "overall_match_score": 80,
            "cultural_fit": {"assessment": "Strong alignment", "score": 90}
        });
        let analysis: MatchAnalysis = serde_json::from_value(json).unwrap();
        assert_eq!(analysis.cultural_fit.assessment, "Strong alignment");
        assert_eq!(analysis.cultural_fit.score, 90.0);
    }

    #[test]
    fn test_normalize_match_drops_invented_skills() {
        let analysis = MatchAnalysis {
            skills_match: SkillsMatch {
                matching_skills: vec![
                    "rust".to_string(),
                    "Haskell".to_string(), // on neither side
                    "Docker".to_string(),
                ],
                missing_skills: vec![
                    "Kubernetes".to_string(),
                    "RUST".to_string(),
                    "Quantum Computing".to_string(), // on neither side
                ],
                score: 70.0,
            },
            ..MatchAnalysis::default()
        };
        let out = normalize_match_analysis(analysis, &make_profile(), &make_job());
        assert_eq!(out.skills_match.matching_skills, vec!["rust", "Docker"]);
        // "RUST" is claimed as matching, so it cannot also be missing.
        assert_eq!(out.skills_match.missing_skills, vec!["Kubernetes"]);
    }

    #[test]
    fn test_normalize_ats_reconciles_keywords() {
        let keywords = vec![
            "Rust".to_string(),
            "Kubernetes".to_string(),
            "Docker".to_string(),
            "REST".to_string(),
        ];
        let analysis = AtsAnalysis {
            ats_score: 82.0,
            keyword_match_percentage: 99.0, // model's arithmetic, ignored
            matched_keywords: vec![
                "rust".to_string(),
                "GraphQL".to_string(), // not in the universe
                "REST".to_string(),
            ],
            ..AtsAnalysis::default()
        };
        let out = normalize_ats(analysis, &keywords);
        assert_eq!(out.matched_keywords, vec!["Rust", "REST"]);
        assert_eq!(out.missing_keywords, vec!["Kubernetes", "Docker"]);
        assert_eq!(out.keyword_match_percentage, 50.0);
    }

    #[test]
    fn test_normalize_ats_empty_universe() {
        let out = normalize_ats(AtsAnalysis::default(), &[]);
        assert_eq!(out.keyword_match_percentage, 0.0);
        assert!(out.matched_keywords.is_empty());
        assert!(out.missing_keywords.is_empty());
    }
}
