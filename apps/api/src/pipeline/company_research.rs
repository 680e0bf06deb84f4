//! Company research with a freshness-windowed cache.
//!
//! The research output has two halves: a general profile of the company
//! (role-independent, cached on the company row) and role-specific insight
//! (recomputed per drive). A deep-research call with web search is attempted
//! first; on transient failure it degrades to a single-pass chat call, and if
//! that also fails a clearly-labelled placeholder is returned so the rest of
//! the pipeline can proceed.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{ChatParams, LlmClient};
use crate::models::CompanyRow;

use super::prompts::{COMPANY_RESEARCH_FALLBACK_PROMPT, COMPANY_RESEARCH_PROMPT};
use super::resume_parser::CandidateProfile;

/// Cached general research older than this is refetched.
pub const RESEARCH_TTL_DAYS: i64 = 7;

fn unknown() -> String {
    "Unknown".to_string()
}

/// The role-independent slice of company research. This is what gets cached
/// on the company row and shared across drives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralCompanyProfile {
    #[serde(default = "unknown")]
    pub company_overview: String,
    #[serde(default = "unknown")]
    pub industry: String,
    #[serde(default = "unknown")]
    pub company_size: String,
    #[serde(default)]
    pub culture_values: Vec<String>,
    #[serde(default)]
    pub tech_stack: Vec<String>,
    #[serde(default)]
    pub recent_news: Vec<String>,
    #[serde(default = "unknown")]
    pub work_environment: String,
    #[serde(default)]
    pub key_facts: Vec<String>,
}

/// Role-specific insight, recomputed per drive and never cached.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RoleInsights {
    #[serde(default)]
    pub role_expectations: String,
    #[serde(default)]
    pub interview_process: Vec<String>,
    #[serde(default)]
    pub success_traits: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TailoringRecommendations {
    #[serde(default)]
    pub resume_emphasis: Vec<String>,
    #[serde(default)]
    pub keywords_to_include: Vec<String>,
    #[serde(default)]
    pub cover_letter_angle: String,
    #[serde(default)]
    pub talking_points: Vec<String>,
}

/// Full research output for one company + role pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyResearch {
    #[serde(flatten)]
    pub general: GeneralCompanyProfile,
    #[serde(default)]
    pub role_insights: RoleInsights,
    #[serde(default)]
    pub tailoring_recommendations: TailoringRecommendations,
    /// Provenance notes: which path produced this record (deep research,
    /// fallback chat, placeholder) and anything the model flagged as unsure.
    #[serde(default)]
    pub source_notes: Vec<String>,
}

/// Whether a cached research timestamp is still inside the freshness window.
pub fn is_fresh(last_researched: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match last_researched {
        Some(ts) => now - ts < Duration::days(RESEARCH_TTL_DAYS),
        None => false,
    }
}

/// Overlays cached general fields onto a freshly-fetched profile.
///
/// Cached non-empty values win: the cache exists so repeated analyses of the
/// same company within the window stay consistent with each other.
pub fn merge_cached_general(general: &mut GeneralCompanyProfile, cached: &Value) {
    let Ok(cached_profile) = serde_json::from_value::<GeneralCompanyProfile>(cached.clone()) else {
        warn!("Cached research data did not deserialize; ignoring cache");
        return;
    };

    let take_str = |cached: String, fresh: &mut String| {
        if !cached.trim().is_empty() && cached != "Unknown" {
            *fresh = cached;
        }
    };
    let take_list = |cached: Vec<String>, fresh: &mut Vec<String>| {
        if !cached.is_empty() {
            *fresh = cached;
        }
    };

    take_str(cached_profile.company_overview, &mut general.company_overview);
    take_str(cached_profile.industry, &mut general.industry);
    take_str(cached_profile.company_size, &mut general.company_size);
    take_list(cached_profile.culture_values, &mut general.culture_values);
    take_list(cached_profile.tech_stack, &mut general.tech_stack);
    take_list(cached_profile.recent_news, &mut general.recent_news);
    take_str(cached_profile.work_environment, &mut general.work_environment);
    take_list(cached_profile.key_facts, &mut general.key_facts);
}

/// Placeholder record returned when every research path has failed. Labelled
/// so nothing downstream mistakes it for real intelligence.
pub fn placeholder_research(company_name: &str) -> CompanyResearch {
    CompanyResearch {
        general: GeneralCompanyProfile {
            company_overview: format!(
                "Research for {company_name} is currently unavailable."
            ),
            industry: unknown(),
            company_size: unknown(),
            culture_values: Vec::new(),
            tech_stack: Vec::new(),
            recent_news: Vec::new(),
            work_environment: unknown(),
            key_facts: Vec::new(),
        },
        role_insights: RoleInsights::default(),
        tailoring_recommendations: TailoringRecommendations::default(),
        source_notes: vec!["placeholder: research unavailable".to_string()],
    }
}

/// Condenses a parsed profile into the short candidate brief the research
/// prompts take, so role insights can speak to this student's background.
pub fn candidate_snapshot(profile: &CandidateProfile) -> String {
    let experience: Vec<String> = profile
        .experience
        .iter()
        .map(|e| format!("{} at {}", e.title, e.company))
        .collect();
    let projects: Vec<String> = profile.projects.iter().map(|p| p.name.clone()).collect();
    format!(
        "Summary: {}\nSkills: {}\nExperience: {}\nProjects: {}",
        profile.summary,
        profile.skills.join(", "),
        experience.join("; "),
        projects.join("; "),
    )
}

/// Researches a company for a specific role, consulting and refreshing the
/// cached general profile. `snapshot` is an optional candidate brief that
/// sharpens the role-specific insight.
///
/// Concurrent requests for the same company may each run research; whichever
/// finishes last overwrites the cache. Both results are valid, so no locking.
pub async fn research_company(
    llm: &LlmClient,
    db: &PgPool,
    company: &CompanyRow,
    job_title: &str,
    job_description: &str,
    snapshot: Option<&str>,
) -> Result<CompanyResearch, sqlx::Error> {
    let now = Utc::now();
    let cache_fresh = is_fresh(company.last_researched, now);

    let mut research = fetch_research(llm, company, job_title, job_description, snapshot).await;

    if cache_fresh {
        if let Some(cached) = &company.research_data {
            merge_cached_general(&mut research.general, cached);
            research
                .source_notes
                .push("general profile served from cache".to_string());
        }
    }

    // Persist only the general slice; role insight is drive-specific.
    // No write when the cache was fresh (a rewrite would extend the TTL and
    // the entry would never expire) and no write for placeholders (a
    // transient outage must not evict a previously good entry).
    let is_placeholder = research
        .source_notes
        .iter()
        .any(|n| n.starts_with("placeholder"));
    if !cache_fresh && !is_placeholder {
        persist_general(db, company.id, &research.general, now).await?;
    }

    Ok(research)
}

async fn fetch_research(
    llm: &LlmClient,
    company: &CompanyRow,
    job_title: &str,
    job_description: &str,
    snapshot: Option<&str>,
) -> CompanyResearch {
    let snapshot = snapshot.unwrap_or("not provided");
    let prompt = COMPANY_RESEARCH_PROMPT
        .replace("{company_name}", &company.name)
        .replace("{website}", company.website.as_deref().unwrap_or("Unknown"))
        .replace("{industry}", company.industry.as_deref().unwrap_or("Unknown"))
        .replace("{job_title}", job_title)
        .replace("{job_description}", job_description)
        .replace("{candidate_snapshot}", snapshot);

    match llm.deep_research_json::<CompanyResearch>(&prompt).await {
        Ok(mut research) => {
            research
                .source_notes
                .push("deep research with web search".to_string());
            return research;
        }
        Err(e) if e.is_transient() => {
            warn!(
                "Deep research failed for {} ({e}); falling back to single-pass query",
                company.name
            );
        }
        Err(e) => {
            // Non-transient means a caller bug or bad credentials. Do not
            // mask it behind a second call that will fail the same way.
            warn!("Deep research rejected for {}: {e}", company.name);
            return placeholder_research(&company.name);
        }
    }

    let fallback_prompt = COMPANY_RESEARCH_FALLBACK_PROMPT
        .replace("{company_name}", &company.name)
        .replace("{website}", company.website.as_deref().unwrap_or("Unknown"))
        .replace("{industry}", company.industry.as_deref().unwrap_or("Unknown"))
        .replace("{job_title}", job_title)
        .replace("{job_description}", job_description)
        .replace("{candidate_snapshot}", snapshot);

    let params = ChatParams {
        json_mode: true,
        ..ChatParams::default()
    };

    match llm
        .call_json::<CompanyResearch>(&fallback_prompt, JSON_ONLY_SYSTEM, &params)
        .await
    {
        Ok(mut research) => {
            research
                .source_notes
                .push("fallback: model knowledge only, no web search".to_string());
            research
        }
        Err(e) => {
            warn!("Fallback research also failed for {}: {e}", company.name);
            placeholder_research(&company.name)
        }
    }
}

async fn persist_general(
    db: &PgPool,
    company_id: Uuid,
    general: &GeneralCompanyProfile,
    now: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    let data = serde_json::to_value(general).unwrap_or(Value::Null);
    sqlx::query("UPDATE companies SET research_data = $1, last_researched = $2 WHERE id = $3")
        .bind(&data)
        .bind(now)
        .bind(company_id)
        .execute(db)
        .await?;
    info!("Cached general research for company {company_id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_fresh_inside_window() {
        let now = Utc::now();
        assert!(is_fresh(Some(now - Duration::days(6)), now));
    }

    #[test]
    fn test_is_fresh_outside_window_or_never() {
        let now = Utc::now();
        assert!(!is_fresh(Some(now - Duration::days(7)), now));
        assert!(!is_fresh(Some(now - Duration::days(30)), now));
        assert!(!is_fresh(None, now));
    }

    #[test]
    fn test_merge_cached_general_prefers_cached_values() {
        let mut fresh = GeneralCompanyProfile {
            company_overview: "Fresh overview".to_string(),
            industry: "Fintech".to_string(),
            company_size: unknown(),
            culture_values: vec!["fresh value".to_string()],
            tech_stack: Vec::new(),
            recent_news: Vec::new(),
            work_environment: unknown(),
            key_facts: Vec::new(),
        };
        let cached = serde_json::json!({
            "company_overview": "Cached overview",
            "industry": "",
            "tech_stack": ["Rust", "Postgres"]
        });

        merge_cached_general(&mut fresh, &cached);

        // Non-empty cached fields win; empty cached fields leave fresh intact.
        assert_eq!(fresh.company_overview, "Cached overview");
        assert_eq!(fresh.industry, "Fintech");
        assert_eq!(fresh.tech_stack, vec!["Rust", "Postgres"]);
        assert_eq!(fresh.culture_values, vec!["fresh value"]);
    }

    #[test]
    fn test_merge_cached_general_ignores_unknown_sentinel() {
        let mut fresh = GeneralCompanyProfile {
            company_overview: "Fresh overview".to_string(),
            industry: "Fintech".to_string(),
            company_size: "200-500".to_string(),
            culture_values: Vec::new(),
            tech_stack: Vec::new(),
            recent_news: Vec::new(),
            work_environment: unknown(),
            key_facts: Vec::new(),
        };
        let cached = serde_json::json!({ "company_size": "Unknown" });

        merge_cached_general(&mut fresh, &cached);
        assert_eq!(fresh.company_size, "200-500");
    }

    #[test]
    fn test_candidate_snapshot_covers_profile_highlights() {
        let profile: CandidateProfile = serde_json::from_value(serde_json::json!({
            "summary": "Backend-focused student",
            "skills": ["Rust", "SQL"],
            "experience": [{"title": "Intern", "company": "Acme"}],
            "projects": [{"name": "Crawler"}]
        }))
        .unwrap();
        let snapshot = candidate_snapshot(&profile);
        assert!(snapshot.contains("Backend-focused student"));
        assert!(snapshot.contains("Rust, SQL"));
        assert!(snapshot.contains("Intern at Acme"));
        assert!(snapshot.contains("Crawler"));
    }

    #[test]
    fn test_placeholder_is_labelled() {
        let research = placeholder_research("Acme");
        assert!(research.source_notes[0].starts_with("placeholder"));
        assert!(research.general.company_overview.contains("Acme"));
    }

    #[test]
    fn test_research_flattens_general_fields() {
        // The wire format keeps general fields at the top level next to
        // role_insights, matching what the prompts ask the model to emit.
        let json = serde_json::json!({
            "company_overview": "An example company",
            "tech_stack": ["Go"],
            "role_insights": { "role_expectations": "Build services" }
        });
        let research: CompanyResearch = serde_json::from_value(json).unwrap();
        assert_eq!(research.general.company_overview, "An example company");
        assert_eq!(research.role_insights.role_expectations, "Build services");
    }
}
