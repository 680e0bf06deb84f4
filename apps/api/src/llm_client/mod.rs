/// LLM Client: the single point of entry for all OpenAI API calls in the
/// placements backend.
///
/// ARCHITECTURAL RULE: No other module may call the OpenAI API directly.
/// All model interactions MUST go through this module.
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

/// The chat model used for all structured extraction and scoring calls.
/// Intentionally hardcoded to prevent accidental drift between stages.
pub const MODEL: &str = "gpt-4o";
/// The deep-research model used for company intelligence. Calls against it may
/// run for minutes; the client supplies the long timeout.
pub const RESEARCH_MODEL: &str = "o4-mini-deep-research";
const MAX_RETRIES: u32 = 3;
/// Default per-request timeout for chat calls.
pub const CHAT_TIMEOUT_SECS: u64 = 120;
/// Timeout for deep research calls. The upstream API allows several minutes.
pub const DEEP_RESEARCH_TIMEOUT_SECS: u64 = 600;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

impl LlmError {
    /// Whether the failure is a service-side condition (timeout, overload,
    /// malformed output) rather than a caller bug (bad request, bad key).
    ///
    /// Fallback paths (e.g. deep research degrading to a single-pass query)
    /// are gated on this, so programming errors are never masked as outages.
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::Http(_) | LlmError::Timeout => true,
            LlmError::Api { status, .. } => *status == 429 || *status >= 500,
            LlmError::Parse(_) | LlmError::EmptyContent => true,
            LlmError::RateLimited { .. } => true,
        }
    }
}

/// Tuning knobs for a single chat call. Stages override only what they need.
#[derive(Debug, Clone)]
pub struct ChatParams {
    pub max_tokens: u32,
    pub temperature: f32,
    /// Ask the API for its strict-JSON response mode.
    pub json_mode: bool,
}

impl Default for ChatParams {
    fn default() -> Self {
        Self {
            max_tokens: 2000,
            temperature: 0.3,
            json_mode: false,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    error: OpenAiErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    message: String,
}

/// Deep-research request against the Responses API. The web-search tool is
/// what distinguishes it from a plain chat call.
#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: &'a str,
    tools: Vec<ResponsesTool>,
}

#[derive(Debug, Serialize)]
struct ResponsesTool {
    #[serde(rename = "type")]
    tool_type: &'static str,
}

/// The single LLM client used by every pipeline stage.
/// Wraps the OpenAI Chat Completions and Responses APIs with retry logic and
/// structured output helpers.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    api_base: String,
}

impl LlmClient {
    pub fn new(api_key: String, api_base: String) -> Self {
        Self {
            // No client-level timeout: each call sets its own, because deep
            // research runs far longer than chat calls.
            client: Client::new(),
            api_key,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Makes a chat completion call, returning the assistant message text.
    /// Retries on 429 and 5xx with exponential backoff.
    pub async fn call(
        &self,
        prompt: &str,
        system: &str,
        params: &ChatParams,
    ) -> Result<String, LlmError> {
        let request_body = ChatRequest {
            model: MODEL,
            max_tokens: params.max_tokens,
            temperature: params.temperature,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            response_format: params.json_mode.then_some(ResponseFormat {
                format_type: "json_object",
            }),
        };

        let url = format!("{}/chat/completions", self.api_base);
        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .header("content-type", "application/json")
                .timeout(std::time::Duration::from_secs(CHAT_TIMEOUT_SECS))
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) if e.is_timeout() => {
                    last_error = Some(LlmError::Timeout);
                    continue;
                }
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<OpenAiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let chat_response: ChatResponse = response.json().await?;

            if let Some(usage) = &chat_response.usage {
                debug!(
                    "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                    usage.prompt_tokens, usage.completion_tokens
                );
            }

            return chat_response
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .filter(|t| !t.trim().is_empty())
                .ok_or(LlmError::EmptyContent);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }

    /// Convenience method that calls the model and deserializes the text
    /// response as JSON. The prompt must instruct the model to return JSON.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        system: &str,
        params: &ChatParams,
    ) -> Result<T, LlmError> {
        let text = self.call(prompt, system, params).await?;
        let text = strip_json_fences(&text);
        serde_json::from_str(text).map_err(LlmError::Parse)
    }

    /// Makes a deep-research call against the Responses API with web search
    /// enabled. Not retried: a single attempt can already run for minutes, and
    /// the caller has its own fallback path.
    pub async fn deep_research_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
    ) -> Result<T, LlmError> {
        let request_body = ResponsesRequest {
            model: RESEARCH_MODEL,
            input: prompt,
            tools: vec![ResponsesTool {
                tool_type: "web_search_preview",
            }],
        };

        let url = format!("{}/responses", self.api_base);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .timeout(std::time::Duration::from_secs(DEEP_RESEARCH_TIMEOUT_SECS))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OpenAiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let value: serde_json::Value = response.json().await?;
        let text = extract_responses_text(&value).ok_or(LlmError::EmptyContent)?;
        let text = strip_json_fences(&text);
        serde_json::from_str(text).map_err(LlmError::Parse)
    }
}

/// Pulls the concatenated output text out of a Responses API payload.
/// Prefers the convenience `output_text` field, else walks `output[].content[]`.
fn extract_responses_text(value: &serde_json::Value) -> Option<String> {
    if let Some(text) = value.get("output_text").and_then(|v| v.as_str()) {
        if !text.trim().is_empty() {
            return Some(text.to_string());
        }
    }

    let mut fragments = String::new();
    for item in value.get("output")?.as_array()? {
        let Some(contents) = item.get("content").and_then(|c| c.as_array()) else {
            continue;
        };
        for content in contents {
            if content.get("type").and_then(|t| t.as_str()) == Some("output_text") {
                if let Some(text) = content.get("text").and_then(|t| t.as_str()) {
                    fragments.push_str(text);
                }
            }
        }
    }

    if fragments.trim().is_empty() {
        None
    } else {
        Some(fragments)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
///
/// Every stage funnels model text through this before parsing, so the
/// fence-handling contract lives in exactly one place.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_unterminated_fence() {
        let input = "```json\n{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_is_transient_rate_limit_and_server_errors() {
        assert!(LlmError::Api {
            status: 429,
            message: String::new()
        }
        .is_transient());
        assert!(LlmError::Api {
            status: 503,
            message: String::new()
        }
        .is_transient());
        assert!(LlmError::Timeout.is_transient());
        assert!(LlmError::EmptyContent.is_transient());
    }

    #[test]
    fn test_is_transient_client_errors_are_not() {
        // 401/400 are configuration or programming errors; fallback paths
        // must not swallow them.
        assert!(!LlmError::Api {
            status: 401,
            message: String::new()
        }
        .is_transient());
        assert!(!LlmError::Api {
            status: 400,
            message: String::new()
        }
        .is_transient());
    }

    #[test]
    fn test_extract_responses_text_prefers_output_text() {
        let value = serde_json::json!({
            "output_text": "{\"a\": 1}",
            "output": []
        });
        assert_eq!(extract_responses_text(&value).unwrap(), "{\"a\": 1}");
    }

    #[test]
    fn test_extract_responses_text_walks_output_fragments() {
        let value = serde_json::json!({
            "output": [
                {"content": [{"type": "output_text", "text": "{\"a\":"}]},
                {"content": [{"type": "output_text", "text": " 1}"}]}
            ]
        });
        assert_eq!(extract_responses_text(&value).unwrap(), "{\"a\": 1}");
    }

    #[test]
    fn test_extract_responses_text_empty_payload_is_none() {
        let value = serde_json::json!({ "output": [] });
        assert!(extract_responses_text(&value).is_none());
    }
}
