//! LLM client: the single point of entry for upstream model calls.
//!
//! Handlers and services only see the `LanguageModel` trait; `DashScopeClient`
//! is the production backend and tests substitute a scripted implementation.
//! Exactly one HTTP attempt is made per call; there is no retry loop.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const GENERATION_PATH: &str = "/api/v1/services/aigc/text-generation/generation";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Sampling parameters for a single completion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Narrow interface over the upstream model: prompt in, raw text out.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &str, params: GenerationParams) -> Result<String, LlmError>;

    fn model_name(&self) -> &str;
}

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    model: &'a str,
    input: GenerationInput<'a>,
    parameters: GenerationParameters,
}

#[derive(Debug, Serialize)]
struct GenerationInput<'a> {
    prompt: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationParameters {
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
pub struct GenerationResponse {
    pub output: GenerationOutput,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct GenerationOutput {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct DashScopeError {
    #[serde(default)]
    code: Option<String>,
    message: String,
}

/// DashScope text-generation client (Qwen models).
#[derive(Clone)]
pub struct DashScopeClient {
    client: Client,
    api_key: String,
    endpoint: String,
    model: String,
}

impl DashScopeClient {
    pub fn new(
        api_key: String,
        base_url: &str,
        model: String,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), GENERATION_PATH),
            model,
        })
    }
}

#[async_trait]
impl LanguageModel for DashScopeClient {
    async fn complete(&self, prompt: &str, params: GenerationParams) -> Result<String, LlmError> {
        let request_body = GenerationRequest {
            model: &self.model,
            input: GenerationInput { prompt },
            parameters: GenerationParameters {
                max_tokens: params.max_tokens,
                temperature: params.temperature,
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("DashScope API returned {}: {}", status, body);
            let message = serde_json::from_str::<DashScopeError>(&body)
                .map(|e| match e.code {
                    Some(code) => format!("{code}: {}", e.message),
                    None => e.message,
                })
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        let generation: GenerationResponse = serde_json::from_str(&body)?;

        if let Some(usage) = &generation.usage {
            debug!(
                "LLM call succeeded: input_tokens={}, output_tokens={}",
                usage.input_tokens, usage.output_tokens
            );
        }

        generation
            .output
            .text
            .filter(|t| !t.trim().is_empty())
            .ok_or(LlmError::EmptyContent)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let unfenced = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match unfenced {
        Some(stripped) => stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim()),
        None => text.strip_suffix("```").map(str::trim).unwrap_or(text),
    }
}
