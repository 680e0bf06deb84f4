use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Placement drive (a company's hiring round for a specific role).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PlacementDriveRow {
    pub id: Uuid,
    pub company_id: Uuid,
    pub job_title: String,
    pub job_description: String,
    /// Cached output of the job-requirement analysis stage, if any.
    pub job_requirements: Option<Value>,
    pub eligibility_criteria: Option<Value>,
    pub ctc: Option<String>,
    pub location: Option<String>,
    pub drive_date: Option<NaiveDate>,
    pub registration_deadline: Option<NaiveDate>,
    pub status: String,
    /// TPO account that posted the drive.
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// A student's application to a drive. `resume_version` records which resume
/// file was submitted (the personalized render when one exists, otherwise the
/// original upload). Match and ATS scores are snapshotted at apply time.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub student_id: Uuid,
    pub drive_id: Uuid,
    pub resume_version: Option<String>,
    pub match_score: Option<f64>,
    pub ats_score: Option<f64>,
    pub skills_gap: Option<Value>,
    pub status: String,
    pub applied_at: DateTime<Utc>,
}
