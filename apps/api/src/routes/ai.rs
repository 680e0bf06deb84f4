//! Handlers for the AI pipeline API: analysis, application, company
//! research, cover letters, and personalized resume download.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::ChatParams;
use crate::models::{ApplicationRow, CompanyRow, PlacementDriveRow, StudentRow, UserRow};
use crate::notify::generate_confirmation_email;
use crate::pipeline::prompts::COVER_LETTER_PROMPT;
use crate::pipeline::{self, company_research, extractor, resume_parser, JobFitAnalysis};
use crate::render::personalized_resume_path;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct StudentDriveRequest {
    pub student_id: Uuid,
    pub drive_id: Uuid,
}

#[derive(Deserialize, Default)]
pub struct ResearchQuery {
    pub job_title: Option<String>,
    pub job_description: Option<String>,
}

// ─────────────────────────────── lookups ───────────────────────────────

async fn fetch_student(db: &PgPool, id: Uuid) -> Result<StudentRow, AppError> {
    sqlx::query_as::<_, StudentRow>("SELECT * FROM students WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Student {id} not found")))
}

async fn fetch_drive(db: &PgPool, id: Uuid) -> Result<PlacementDriveRow, AppError> {
    sqlx::query_as::<_, PlacementDriveRow>("SELECT * FROM placement_drives WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Placement drive {id} not found")))
}

async fn fetch_company(db: &PgPool, id: Uuid) -> Result<CompanyRow, AppError> {
    sqlx::query_as::<_, CompanyRow>("SELECT * FROM companies WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Company {id} not found")))
}

// ─────────────────────────────── handlers ──────────────────────────────

/// POST /api/v1/ai/analyze-job
/// Runs the full analysis pipeline for one student against one drive.
pub async fn handle_analyze_job(
    State(state): State<AppState>,
    Json(req): Json<StudentDriveRequest>,
) -> Result<Json<JobFitAnalysis>, AppError> {
    let student = fetch_student(&state.db, req.student_id).await?;
    let drive = fetch_drive(&state.db, req.drive_id).await?;
    let company = fetch_company(&state.db, drive.company_id).await?;

    let analysis = pipeline::analyze_job_fit(
        &state.llm,
        &state.db,
        &student,
        &drive,
        &company,
        &state.config.upload_dir,
    )
    .await?;

    Ok(Json(analysis))
}

/// POST /api/v1/ai/apply
/// Applies a student to a drive: runs the pipeline, snapshots the scores on
/// the application row, and sends a confirmation email (best effort).
pub async fn handle_apply(
    State(state): State<AppState>,
    Json(req): Json<StudentDriveRequest>,
) -> Result<Json<ApplicationRow>, AppError> {
    let student = fetch_student(&state.db, req.student_id).await?;
    let drive = fetch_drive(&state.db, req.drive_id).await?;
    let company = fetch_company(&state.db, drive.company_id).await?;

    if !student.is_approved {
        return Err(AppError::Forbidden(
            "Profile not approved by HOD".to_string(),
        ));
    }
    if drive.status != "open" {
        return Err(AppError::Validation(
            "Drive is not open for applications".to_string(),
        ));
    }

    let existing: Option<(Uuid,)> = sqlx::query_as(
        "SELECT id FROM applications WHERE student_id = $1 AND drive_id = $2",
    )
    .bind(student.id)
    .bind(drive.id)
    .fetch_optional(&state.db)
    .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("Already applied to this drive".to_string()));
    }

    let analysis = pipeline::analyze_job_fit(
        &state.llm,
        &state.db,
        &student,
        &drive,
        &company,
        &state.config.upload_dir,
    )
    .await?;

    // Submit the personalized render when it exists, else the original upload.
    let resume_version = analysis
        .personalized_resume_path
        .clone()
        .or_else(|| student.resume_path.clone());

    let skills_gap_json: Option<Value> = analysis
        .skills_gap
        .as_ref()
        .and_then(|g| serde_json::to_value(g).ok());

    let application = sqlx::query_as::<_, ApplicationRow>(
        "INSERT INTO applications \
            (id, student_id, drive_id, resume_version, match_score, ats_score, skills_gap, status, applied_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, 'applied', NOW()) \
         RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(student.id)
    .bind(drive.id)
    .bind(&resume_version)
    .bind(analysis.match_analysis.overall_match_score)
    .bind(analysis.ats_analysis.ats_score)
    .bind(&skills_gap_json)
    .fetch_one(&state.db)
    .await?;

    info!(
        "Student {} applied to drive {} (match={}, ats={})",
        student.id, drive.id, analysis.match_analysis.overall_match_score,
        analysis.ats_analysis.ats_score
    );

    send_application_confirmation(&state, &student, &drive, &company.name).await;

    Ok(Json(application))
}

/// Confirmation mail is best effort; failures are logged and never surface.
async fn send_application_confirmation(
    state: &AppState,
    student: &StudentRow,
    drive: &PlacementDriveRow,
    company_name: &str,
) {
    let user = match sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
        .bind(student.user_id)
        .fetch_optional(&state.db)
        .await
    {
        Ok(row) => row,
        Err(e) => {
            warn!("Could not look up email for student {}: {e}", student.id);
            None
        }
    };
    let Some(user) = user else { return };

    let context = format!(
        "Student {} applied to the {} drive at {}.",
        student.name, drive.job_title, company_name
    );
    let body = generate_confirmation_email(&state.llm, &context, "application confirmation")
        .await
        .unwrap_or_else(|| {
            format!(
                "Hi {},\n\nYour application for {} at {} has been received.\n",
                student.name, drive.job_title, company_name
            )
        });

    if let Err(e) = state
        .mailer
        .send(&user.email, "Application received", &body)
        .await
    {
        warn!("Confirmation email to {} failed: {e}", user.email);
    }
}

/// GET /api/v1/ai/research-company/:company_id
/// Company research with the cached general profile. Role context is
/// optional; without it the research is generic.
pub async fn handle_research_company(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Query(query): Query<ResearchQuery>,
) -> Result<Json<company_research::CompanyResearch>, AppError> {
    let company = fetch_company(&state.db, company_id).await?;

    let job_title = query
        .job_title
        .unwrap_or_else(|| "General campus placement roles".to_string());
    let job_description = query.job_description.unwrap_or_default();

    let research = company_research::research_company(
        &state.llm,
        &state.db,
        &company,
        &job_title,
        &job_description,
        None,
    )
    .await?;

    Ok(Json(research))
}

/// POST /api/v1/ai/cover-letter
/// Drafts a cover letter for one student + drive. Plain text response.
pub async fn handle_cover_letter(
    State(state): State<AppState>,
    Json(req): Json<StudentDriveRequest>,
) -> Result<Json<Value>, AppError> {
    let student = fetch_student(&state.db, req.student_id).await?;
    let drive = fetch_drive(&state.db, req.drive_id).await?;
    let company = fetch_company(&state.db, drive.company_id).await?;

    let resume_path = student
        .resume_path
        .as_deref()
        .ok_or(pipeline::StageError::DocumentMissing)?;
    let path = std::path::PathBuf::from(resume_path);
    let resume_text = tokio::task::spawn_blocking(move || extractor::extract_resume_text(&path))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;
    let profile = resume_parser::parse_resume(&state.llm, &resume_text).await?;

    let snapshot = company_research::candidate_snapshot(&profile);
    let research = company_research::research_company(
        &state.llm,
        &state.db,
        &company,
        &drive.job_title,
        &drive.job_description,
        Some(&snapshot),
    )
    .await?;

    let prompt = COVER_LETTER_PROMPT
        .replace(
            "{candidate_profile}",
            &serde_json::to_string_pretty(&profile).unwrap_or_default(),
        )
        .replace("{job_title}", &drive.job_title)
        .replace("{company_name}", &company.name)
        .replace("{job_description}", &drive.job_description)
        .replace(
            "{company_context}",
            &serde_json::to_string_pretty(&research).unwrap_or_default(),
        );
    let params = ChatParams {
        max_tokens: 800,
        temperature: 0.5,
        json_mode: false,
    };

    let letter = state
        .llm
        .call(
            &prompt,
            "You write specific, grounded cover letters for campus placements.",
            &params,
        )
        .await
        .map_err(|e| AppError::Llm(e.to_string()))?;

    Ok(Json(serde_json::json!({ "cover_letter": letter })))
}

/// GET /api/v1/ai/personalized-resume/:student_id/:drive_id
/// Downloads the rendered personalized resume. 404 until an analysis or
/// application has produced one.
pub async fn handle_download_personalized_resume(
    State(state): State<AppState>,
    Path((student_id, drive_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    let student = fetch_student(&state.db, student_id).await?;

    let path = personalized_resume_path(&state.config.upload_dir, &student.enrollment_no, drive_id);
    let bytes = tokio::fs::read(&path).await.map_err(|_| {
        AppError::NotFound("Personalized resume has not been generated yet".to_string())
    })?;

    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "resume.pdf".to_string());

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    ))
}
