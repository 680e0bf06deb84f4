use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Account row. Role is one of "student", "hod", "tpo".
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Student profile. `resume_path` is set by the upload endpoint and points
/// into the upload directory; it is None until the student uploads a resume.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StudentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub enrollment_no: String,
    pub department: String,
    pub cgpa: Option<f64>,
    pub phone: Option<String>,
    pub resume_path: Option<String>,
    /// JSON array of self-declared skills, distinct from the skills the
    /// resume parser extracts.
    pub skills: Option<Value>,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}
