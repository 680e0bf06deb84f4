//! The AI analysis pipeline.
//!
//! Stage order: extract resume text → parse profile → company research →
//! job analysis → match + ATS scoring → skills gap → personalization →
//! PDF render. The first four outcomes are load-bearing and fail the
//! analysis; skills gap and personalization are advisory and degrade to
//! absent sections.

use axum::http::StatusCode;
use serde::Serialize;
use sqlx::PgPool;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

pub mod company_research;
pub mod extractor;
pub mod job_analysis;
pub mod personalize;
pub mod prompts;
pub mod resume_parser;
pub mod scoring;
pub mod skills_gap;

use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::models::{CompanyRow, PlacementDriveRow, StudentRow};

use company_research::CompanyResearch;
use job_analysis::JobAnalysis;
use personalize::PersonalizedPackage;
use resume_parser::CandidateProfile;
use scoring::{AtsAnalysis, MatchAnalysis};
use skills_gap::SkillsGap;

/// Typed outcome for a failed pipeline stage. Each variant carries a message
/// the student can act on, and maps to a stable HTTP status + error code.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("No resume uploaded. Please upload your resume before requesting analysis.")]
    DocumentMissing,

    #[error("Your resume could not be read. Please re-upload it as a text-based PDF.")]
    DocumentUnreadable,

    #[error("Your resume could not be parsed. Please try again or re-upload a simpler layout.")]
    ResumeUnparseable,

    #[error("Job requirement analysis failed. Please try again shortly.")]
    JobAnalysisFailed,

    #[error("Fit scoring failed. Please try again shortly.")]
    ScoringFailed,

    #[error("Resume personalization failed. Please try again shortly.")]
    PersonalizationFailed,
}

impl StageError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            StageError::DocumentMissing => StatusCode::BAD_REQUEST,
            StageError::DocumentUnreadable | StageError::ResumeUnparseable => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            StageError::JobAnalysisFailed
            | StageError::ScoringFailed
            | StageError::PersonalizationFailed => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            StageError::DocumentMissing => "RESUME_MISSING",
            StageError::DocumentUnreadable => "RESUME_UNREADABLE",
            StageError::ResumeUnparseable => "RESUME_UNPARSEABLE",
            StageError::JobAnalysisFailed => "JOB_ANALYSIS_FAILED",
            StageError::ScoringFailed => "SCORING_FAILED",
            StageError::PersonalizationFailed => "PERSONALIZATION_FAILED",
        }
    }
}

/// Aggregate result of a full analysis run.
#[derive(Debug, Serialize)]
pub struct JobFitAnalysis {
    pub parsed_resume: CandidateProfile,
    pub company_research: CompanyResearch,
    pub job_analysis: JobAnalysis,
    pub match_analysis: MatchAnalysis,
    pub ats_analysis: AtsAnalysis,
    /// Absent when the advisory gap stage failed.
    pub skills_gap: Option<SkillsGap>,
    /// Absent when the advisory personalization stage failed.
    pub personalized_content: Option<PersonalizedPackage>,
    /// Path of the rendered personalized resume PDF, when one was produced.
    pub personalized_resume_path: Option<String>,
}

/// Runs the full pipeline for one student against one drive.
pub async fn analyze_job_fit(
    llm: &LlmClient,
    db: &PgPool,
    student: &StudentRow,
    drive: &PlacementDriveRow,
    company: &CompanyRow,
    upload_dir: &str,
) -> Result<JobFitAnalysis, AppError> {
    let resume_path = student
        .resume_path
        .as_deref()
        .ok_or(StageError::DocumentMissing)?;

    info!(
        "Starting analysis: student {} vs drive {} ({})",
        student.id, drive.id, drive.job_title
    );

    // pdf-extract is CPU-bound and synchronous; keep it off the runtime.
    let path = PathBuf::from(resume_path);
    let resume_text = tokio::task::spawn_blocking(move || extractor::extract_resume_text(&path))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;

    // Parse first: the research call takes a brief of the candidate so the
    // role insights speak to this student's background.
    let profile = resume_parser::parse_resume(llm, &resume_text).await?;
    let snapshot = company_research::candidate_snapshot(&profile);
    let research = company_research::research_company(
        llm,
        db,
        company,
        &drive.job_title,
        &drive.job_description,
        Some(&snapshot),
    )
    .await?;

    let job = job_analysis::analyze_job(
        llm,
        &drive.job_title,
        &drive.job_description,
        drive.job_requirements.as_ref(),
    )
    .await?;

    let company_context =
        serde_json::to_string_pretty(&research).unwrap_or_else(|_| "{}".to_string());
    let (match_analysis, ats_analysis) = tokio::join!(
        scoring::score_match(llm, &profile, &job, &company_context),
        scoring::score_ats(llm, &resume_text, &job),
    );
    let match_analysis = match_analysis?;
    let ats_analysis = ats_analysis?;

    let gap = skills_gap::analyze_skills_gap(llm, &profile, &job, &match_analysis).await;

    let personalized = personalize::personalize_resume(
        llm,
        &profile,
        student,
        &job,
        &research,
        &match_analysis,
        gap.as_ref(),
        &drive.job_title,
        &company.name,
    )
    .await
    .ok();

    let personalized_resume_path = match &personalized {
        Some(pkg) => {
            match crate::render::render_personalized_resume(
                upload_dir,
                &student.enrollment_no,
                drive.id,
                pkg,
            ) {
                Ok(path) => Some(path),
                Err(e) => {
                    // Advisory: the analysis still stands without the PDF.
                    warn!("Personalized resume render failed: {e}");
                    None
                }
            }
        }
        None => None,
    };

    info!(
        "Analysis complete: match={}, ats={}, personalized={}",
        match_analysis.overall_match_score,
        ats_analysis.ats_score,
        personalized_resume_path.is_some()
    );

    Ok(JobFitAnalysis {
        parsed_resume: profile,
        company_research: research,
        job_analysis: job,
        match_analysis,
        ats_analysis,
        skills_gap: gap,
        personalized_content: personalized,
        personalized_resume_path,
    })
}
