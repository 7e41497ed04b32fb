/// LLM Client — the single point of entry for all Claude API calls in the
/// screening service.
///
/// ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
/// All LLM interactions MUST go through this module.
///
/// Model: claude-sonnet-4-5 (hardcoded — do not make configurable to prevent drift)
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::chat::ChatMessage;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The model used for all LLM calls in the screening service.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "claude-sonnet-4-5";
const MAX_TOKENS: u32 = 4096;
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// A capability the model may select, in Anthropic `tools` wire shape.
/// The interview dispatcher builds these from its capability catalog.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

/// The model's tool selection. The name is validated against the capability
/// catalog by the caller — never trusted as-is. Capabilities take no
/// arguments, so only the name is carried.
#[derive(Debug, Clone)]
pub struct ToolSelection {
    pub name: String,
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    temperature: f32,
    messages: Vec<AnthropicMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<&'a [ToolSpec]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<Value>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }

    /// Extracts the first tool-use block's name, if the model selected a tool.
    pub fn tool_selection(&self) -> Option<ToolSelection> {
        self.content
            .iter()
            .find(|b| b.block_type == "tool_use")
            .and_then(|b| b.name.clone())
            .map(|name| ToolSelection { name })
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// The single LLM client used by all interview components.
/// Wraps the Anthropic Messages API with retry logic, trailing-history
/// threading, structured output parsing, and tool selection.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
}

impl LlmClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }

    /// One conversational completion: system prompt, a trailing window of the
    /// session transcript, and the current user message.
    pub async fn call(
        &self,
        system: &str,
        history: &[ChatMessage],
        user_message: &str,
        temperature: f32,
    ) -> Result<String, LlmError> {
        let messages = build_messages(history, user_message);
        let response = self
            .send(AnthropicRequest {
                model: MODEL,
                max_tokens: MAX_TOKENS,
                system,
                temperature,
                messages,
                tools: None,
                tool_choice: None,
            })
            .await?;

        response
            .text()
            .map(str::to_owned)
            .ok_or(LlmError::EmptyContent)
    }

    /// Structured-output completion: calls the model and deserializes its text
    /// response as JSON into `T`. The prompt must instruct the model to return
    /// valid JSON.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        system: &str,
        history: &[ChatMessage],
        user_message: &str,
        temperature: f32,
    ) -> Result<T, LlmError> {
        let text = self.call(system, history, user_message, temperature).await?;
        let text = strip_json_fences(&text);
        serde_json::from_str(text).map_err(LlmError::Parse)
    }

    /// Tool-selection call: presents the capability catalog and asks the model
    /// to pick one. Returns `None` when the model produced no tool-use block —
    /// a legitimate outcome the dispatcher handles with its retry policy.
    pub async fn select_tool(
        &self,
        system: &str,
        history: &[ChatMessage],
        user_message: &str,
        tools: &[ToolSpec],
    ) -> Result<Option<ToolSelection>, LlmError> {
        let messages = build_messages(history, user_message);
        let response = self
            .send(AnthropicRequest {
                model: MODEL,
                max_tokens: MAX_TOKENS,
                system,
                temperature: 0.0,
                messages,
                tools: Some(tools),
                tool_choice: Some(json!({"type": "any"})),
            })
            .await?;

        Ok(response.tool_selection())
    }

    /// Sends a request to the Claude API, returning the full response object.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    async fn send(&self, request_body: AnthropicRequest<'_>) -> Result<LlmResponse, LlmError> {
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
                .post(ANTHROPIC_API_URL)
                .header("x-api-key", &self.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
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
                // Try to parse error message
                let message = serde_json::from_str::<AnthropicError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let llm_response: LlmResponse = response.json().await?;

            debug!(
                "LLM call succeeded: input_tokens={}, output_tokens={}",
                llm_response.usage.input_tokens, llm_response.usage.output_tokens
            );

            return Ok(llm_response);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

/// Turns a trailing transcript window plus the current user message into the
/// Anthropic messages array.
fn build_messages(history: &[ChatMessage], user_message: &str) -> Vec<AnthropicMessage> {
    let mut messages: Vec<AnthropicMessage> = history
        .iter()
        .map(|m| AnthropicMessage {
            role: m.role.as_str(),
            content: m.content.clone(),
        })
        .collect();
    messages.push(AnthropicMessage {
        role: "user",
        content: user_message.to_owned(),
    });
    messages
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
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
