pub mod ai;
pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // AI pipeline API
        .route("/api/v1/ai/analyze-job", post(ai::handle_analyze_job))
        .route("/api/v1/ai/apply", post(ai::handle_apply))
        .route(
            "/api/v1/ai/research-company/:company_id",
            get(ai::handle_research_company),
        )
        .route("/api/v1/ai/cover-letter", post(ai::handle_cover_letter))
        .route(
            "/api/v1/ai/personalized-resume/:student_id/:drive_id",
            get(ai::handle_download_personalized_resume),
        )
        .with_state(state)
}
