use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Company row. `research_data` caches the general (role-independent) slice
/// of AI company research; `last_researched` drives the freshness window.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CompanyRow {
    pub id: Uuid,
    pub name: String,
    pub website: Option<String>,
    pub industry: Option<String>,
    pub description: Option<String>,
    pub research_data: Option<Value>,
    pub last_researched: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
