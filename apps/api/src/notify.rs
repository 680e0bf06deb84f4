//! Outbound notifications. Mail transport is a trait so tests and local dev
//! run against the logging implementation; delivery failures never fail the
//! request that triggered them.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::llm_client::{ChatParams, LlmClient};
use crate::pipeline::prompts::CONFIRMATION_EMAIL_PROMPT;

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

/// Default transport: logs the message instead of delivering it.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        info!("Mail to {to}: {subject}\n{body}");
        Ok(())
    }
}

/// Drafts a confirmation email body with the model. Returns None on failure;
/// callers fall back to a static template or skip the mail.
pub async fn generate_confirmation_email(
    llm: &LlmClient,
    context: &str,
    purpose: &str,
) -> Option<String> {
    let prompt = CONFIRMATION_EMAIL_PROMPT
        .replace("{context}", context)
        .replace("{purpose}", purpose);
    let params = ChatParams {
        max_tokens: 400,
        temperature: 0.5,
        json_mode: false,
    };

    match llm
        .call(&prompt, "You write short, clear emails for a student placement portal.", &params)
        .await
    {
        Ok(body) => Some(body),
        Err(e) => {
            warn!("Confirmation email generation failed: {e}");
            None
        }
    }
}
