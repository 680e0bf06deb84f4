//! Resume personalization. Rewrites the candidate's material for one specific
//! drive: reordered skills, impact-framed bullets, company-aware tailoring
//! notes. The model proposes; `enforce_grounding` then strips anything the
//! source profile cannot back up, so the rendered resume never claims an
//! employer or certification the student does not have.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, NO_FABRICATION_INSTRUCTION};
use crate::llm_client::{ChatParams, LlmClient};
use crate::models::StudentRow;

use super::company_research::CompanyResearch;
use super::job_analysis::JobAnalysis;
use super::prompts::PERSONALIZE_PROMPT;
use super::resume_parser::{CandidateProfile, NOT_MENTIONED};
use super::scoring::MatchAnalysis;
use super::skills_gap::SkillsGap;
use super::StageError;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ResumeHeader {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
    /// Portfolio, GitHub, LinkedIn and the like, as the resume states them.
    #[serde(default)]
    pub links: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SkillsSection {
    #[serde(default)]
    pub primary_skills: Vec<String>,
    #[serde(default)]
    pub secondary_skills: Vec<String>,
    #[serde(default)]
    pub tooling: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperienceItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub impact_bullets: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectItem {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub impact_bullets: Vec<String>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EducationItem {
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub cgpa: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TailoringNotes {
    #[serde(default)]
    pub culture_fit: String,
    #[serde(default)]
    pub interview_talking_points: Vec<String>,
    #[serde(default)]
    pub ats_keywords: Vec<String>,
}

/// The full personalized resume content, ready for layout.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PersonalizedPackage {
    #[serde(default)]
    pub header: ResumeHeader,
    /// One-line positioning statement rendered under the name.
    #[serde(default)]
    pub branding_headline: String,
    #[serde(default)]
    pub professional_summary: String,
    #[serde(default)]
    pub career_highlights: Vec<String>,
    #[serde(default)]
    pub skills: SkillsSection,
    #[serde(default)]
    pub experience: Vec<ExperienceItem>,
    #[serde(default)]
    pub projects: Vec<ProjectItem>,
    #[serde(default)]
    pub education: Vec<EducationItem>,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub tailoring_notes: TailoringNotes,
}

/// Builds the resume header from the parsed profile, falling back to the
/// student record for fields the resume itself did not mention.
pub fn compose_header(profile: &CandidateProfile, student: &StudentRow) -> ResumeHeader {
    let pick = |from_resume: &str, fallback: Option<&str>| -> String {
        if from_resume != NOT_MENTIONED && !from_resume.trim().is_empty() {
            from_resume.to_string()
        } else {
            fallback.unwrap_or("").to_string()
        }
    };

    ResumeHeader {
        name: pick(&profile.name, Some(&student.name)),
        email: pick(&profile.email, None),
        phone: pick(&profile.phone, student.phone.as_deref()),
        location: pick(&profile.location, None),
        links: profile.links.clone(),
    }
}

/// Strips claims the candidate profile cannot back up.
///
/// Certifications are all-or-nothing: if the profile lists none, the model
/// must not introduce any. Experience items survive only if their employer
/// appears in the profile (case-insensitive).
pub fn enforce_grounding(pkg: &mut PersonalizedPackage, profile: &CandidateProfile) {
    if profile.certifications.is_empty() && !pkg.certifications.is_empty() {
        warn!(
            "Dropping {} fabricated certifications from personalized resume",
            pkg.certifications.len()
        );
        pkg.certifications.clear();
    }

    let known_companies: Vec<String> = profile
        .experience
        .iter()
        .map(|e| e.company.to_lowercase())
        .collect();
    let before = pkg.experience.len();
    pkg.experience
        .retain(|item| known_companies.contains(&item.company.to_lowercase()));
    if pkg.experience.len() < before {
        warn!(
            "Dropped {} experience items with unknown employers",
            before - pkg.experience.len()
        );
    }
}

/// Generates the personalized resume content for one drive.
pub async fn personalize_resume(
    llm: &LlmClient,
    profile: &CandidateProfile,
    student: &StudentRow,
    job: &JobAnalysis,
    research: &CompanyResearch,
    match_analysis: &MatchAnalysis,
    gap: Option<&SkillsGap>,
    job_title: &str,
    company_name: &str,
) -> Result<PersonalizedPackage, StageError> {
    let gap_json = gap
        .and_then(|g| serde_json::to_string_pretty(g).ok())
        .unwrap_or_else(|| "not available".to_string());
    let prompt = PERSONALIZE_PROMPT
        .replace(
            "{candidate_profile}",
            &serde_json::to_string_pretty(profile).unwrap_or_default(),
        )
        .replace(
            "{job_analysis}",
            &serde_json::to_string_pretty(job).unwrap_or_default(),
        )
        .replace(
            "{company_research}",
            &serde_json::to_string_pretty(research).unwrap_or_default(),
        )
        .replace(
            "{match_analysis}",
            &serde_json::to_string_pretty(match_analysis).unwrap_or_default(),
        )
        .replace("{skills_gap}", &gap_json)
        .replace("{job_title}", job_title)
        .replace("{company_name}", company_name);
    let system = format!("{JSON_ONLY_SYSTEM} {NO_FABRICATION_INSTRUCTION}");
    let params = ChatParams {
        max_tokens: 3000,
        json_mode: true,
        ..ChatParams::default()
    };

    let mut pkg: PersonalizedPackage = llm
        .call_json(&prompt, &system, &params)
        .await
        .map_err(|e| {
            warn!("Personalization failed: {e}");
            StageError::PersonalizationFailed
        })?;

    pkg.header = compose_header(profile, student);
    enforce_grounding(&mut pkg, profile);

    info!(
        "Personalized resume for {company_name}: {} experience items, {} projects",
        pkg.experience.len(),
        pkg.projects.len()
    );
    Ok(pkg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn make_student() -> StudentRow {
        StudentRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Asha Rao".to_string(),
            enrollment_no: "EN2021001".to_string(),
            department: "CSE".to_string(),
            cgpa: Some(8.4),
            phone: Some("+91-9000000000".to_string()),
            resume_path: None,
            skills: None,
            is_approved: true,
            created_at: Utc::now(),
        }
    }

    fn make_profile(json: serde_json::Value) -> CandidateProfile {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_compose_header_prefers_resume_fields() {
        let profile = make_profile(serde_json::json!({
            "name": "A. Rao",
            "phone": "+91-9111111111"
        }));
        let header = compose_header(&profile, &make_student());
        assert_eq!(header.name, "A. Rao");
        assert_eq!(header.phone, "+91-9111111111");
    }

    #[test]
    fn test_compose_header_falls_back_to_student_record() {
        let profile = make_profile(serde_json::json!({}));
        let header = compose_header(&profile, &make_student());
        assert_eq!(header.name, "Asha Rao");
        assert_eq!(header.phone, "+91-9000000000");
        assert_eq!(header.email, "");
    }

    #[test]
    fn test_enforce_grounding_clears_invented_certifications() {
        let profile = make_profile(serde_json::json!({}));
        let mut pkg = PersonalizedPackage {
            certifications: vec!["AWS Solutions Architect".to_string()],
            ..PersonalizedPackage::default()
        };
        enforce_grounding(&mut pkg, &profile);
        assert!(pkg.certifications.is_empty());
    }

    #[test]
    fn test_enforce_grounding_keeps_real_certifications() {
        let profile = make_profile(serde_json::json!({
            "certifications": ["OCI Foundations"]
        }));
        let mut pkg = PersonalizedPackage {
            certifications: vec!["OCI Foundations".to_string()],
            ..PersonalizedPackage::default()
        };
        enforce_grounding(&mut pkg, &profile);
        assert_eq!(pkg.certifications, vec!["OCI Foundations"]);
    }

    #[test]
    fn test_enforce_grounding_drops_unknown_employers() {
        let profile = make_profile(serde_json::json!({
            "experience": [{"title": "Intern", "company": "Acme Corp"}]
        }));
        let mut pkg = PersonalizedPackage {
            experience: vec![
                ExperienceItem {
                    title: "Intern".to_string(),
                    company: "ACME CORP".to_string(),
                    duration: "Summer 2024".to_string(),
                    impact_bullets: Vec::new(),
                },
                ExperienceItem {
                    title: "Engineer".to_string(),
                    company: "Globex".to_string(),
                    duration: "2023".to_string(),
                    impact_bullets: Vec::new(),
                },
            ],
            ..PersonalizedPackage::default()
        };
        enforce_grounding(&mut pkg, &profile);
        assert_eq!(pkg.experience.len(), 1);
        assert_eq!(pkg.experience[0].company, "ACME CORP");
    }
}
