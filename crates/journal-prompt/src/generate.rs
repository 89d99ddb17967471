//! Client for the model's `responses` endpoint.
//!
//! One request per run: `{model, instructions, input}` in, free-form text
//! out. The text is returned as-is; [`crate::normalize`] decides whether it
//! is usable.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::GenerationConfig;
use crate::prompt::Prompt;

pub const OPENAI_API_URL: &str = "https://api.openai.com/v1";

/// Default model for the generation call.
pub const DEFAULT_MODEL: &str = "gpt-5.2";

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("API error: {0}")]
    Api(String),

    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("response contained no output text")]
    Empty,
}

// ── Wire types ─────────────────────────────────────────────────────

#[derive(Serialize, Debug)]
pub struct ResponsesRequest<'a> {
    pub model: &'a str,
    pub instructions: &'a str,
    pub input: &'a str,
}

#[derive(Deserialize, Debug)]
struct RawResponse {
    #[serde(default)]
    output_text: Option<String>,
    #[serde(default)]
    output: Vec<RawOutputItem>,
    #[serde(default)]
    error: Option<ApiErrorResponse>,
    #[serde(default)]
    usage: Option<UsageInfo>,
}

#[derive(Deserialize, Debug)]
struct RawOutputItem {
    #[serde(rename = "type")]
    item_type: String,
    #[serde(default)]
    content: Vec<RawContentPart>,
}

#[derive(Deserialize, Debug)]
struct RawContentPart {
    #[serde(rename = "type")]
    part_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiErrorResponse {
    message: String,
}

/// Token usage statistics.
#[derive(Deserialize, Debug, Clone)]
pub struct UsageInfo {
    pub input_tokens: Option<u32>,
    pub output_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

impl RawResponse {
    /// Top-level `output_text` if the API supplied it, else every
    /// `output_text` part of every `message` item, concatenated.
    fn text(self) -> Option<String> {
        if let Some(text) = self.output_text.filter(|t| !t.trim().is_empty()) {
            return Some(text);
        }
        let text: String = self
            .output
            .into_iter()
            .filter(|item| item.item_type == "message")
            .flat_map(|item| item.content)
            .filter(|part| part.part_type == "output_text")
            .filter_map(|part| part.text)
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

// ── Client ─────────────────────────────────────────────────────────

/// Async HTTP client for the responses endpoint.
pub struct ResponsesClient {
    client: reqwest::Client,
    api_key: String,
    url: String,
    model: String,
}

impl ResponsesClient {
    pub fn new(config: &GenerationConfig) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("journal-prompt/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(GenerationError::Client)?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            url: format!("{}/responses", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send the prompt and return the model's raw output text.
    pub async fn generate(&self, prompt: &Prompt) -> Result<String, GenerationError> {
        let body = ResponsesRequest {
            model: &self.model,
            instructions: &prompt.instructions,
            input: &prompt.input,
        };
        debug!(
            "LLM request: model={}, instructions={} bytes, input={} bytes",
            self.model,
            prompt.instructions.len(),
            prompt.input.len(),
        );

        let start = Instant::now();

        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(GenerationError::Request)?;

        let status = resp.status();
        let text = resp.text().await.map_err(GenerationError::Request)?;

        debug!(
            "LLM response: HTTP {} in {:.1}s ({} bytes)",
            status,
            start.elapsed().as_secs_f64(),
            text.len()
        );

        if !status.is_success() {
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: RawResponse = serde_json::from_str(&text)?;

        if let Some(err) = parsed.error {
            return Err(GenerationError::Api(err.message));
        }

        if let Some(ref usage) = parsed.usage {
            debug!(
                "Token usage: input={}, output={}, total={}",
                usage.input_tokens.unwrap_or(0),
                usage.output_tokens.unwrap_or(0),
                usage.total_tokens.unwrap_or(0),
            );
        }

        let output = parsed.text().ok_or(GenerationError::Empty)?;
        trace!("LLM output: {output:?}");
        Ok(output)
    }
}
