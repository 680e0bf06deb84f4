use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::notify::Mailer;

/// Shared application state injected into all route handlers via Axum
/// extractors. Constructed once at startup; there are no ambient singletons.
/// Everything that touches persistence, mail, or the model goes through here.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub llm: LlmClient,
    /// Pluggable mail transport. Default: `LogMailer`; delivery failures are
    /// logged and never fail the triggering request.
    pub mailer: Arc<dyn Mailer>,
    pub config: Config,
}
