//! Generation service abstraction.
//!
//! The [`Generator`] trait is the only way the agents reach the text
//! generation service: one prompt in, raw text out. Production code uses
//! [`GeminiGenerator`]; tests use scripted generators that replay fixed
//! replies without touching the network.

use anyhow::{Context, Result};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::RETRY_AFTER;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::io::config::ClientConfig;

/// Longest error body kept in [`GenerationError::Api`].
const ERROR_BODY_LIMIT: usize = 500;

/// The generation call itself failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("transport failure: {message}")]
    Transport { message: String, timed_out: bool },

    #[error("authentication failed (HTTP {status})")]
    Authentication { status: u16 },

    #[error("rate limited{}", .retry_after.map(|s| format!(" (retry after {s}s)")).unwrap_or_default())]
    RateLimited { retry_after: Option<u64> },

    #[error("service error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("undecodable service response: {0}")]
    InvalidResponse(String),
}

/// Abstraction over text generation backends.
pub trait Generator {
    /// Send one prompt and return the raw response text.
    ///
    /// A response without text yields an empty string, never an error.
    fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

impl<G: Generator + ?Sized> Generator for &G {
    fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        (**self).generate(prompt)
    }
}

/// Generator backed by the Gemini `generateContent` REST endpoint.
pub struct GeminiGenerator {
    client: Client,
    config: ClientConfig,
}

impl GeminiGenerator {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("build HTTP client")?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}:generateContent",
            self.config.base_url,
            model_path(&self.config.model)
        )
    }
}

impl Generator for GeminiGenerator {
    #[instrument(skip_all, fields(model = %self.config.model, prompt_bytes = prompt.len()))]
    fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let request = build_request(prompt, self.config.temperature);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .map_err(|err| GenerationError::Transport {
                message: err.to_string(),
                timed_out: err.is_timeout(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<u64>().ok());
            let body = response.text().unwrap_or_default();
            let err = classify_status(status, retry_after, &body);
            warn!(status = status.as_u16(), error = %err, "generation request rejected");
            return Err(err);
        }

        let body: GenerateContentResponse = response
            .json()
            .map_err(|err| GenerationError::InvalidResponse(err.to_string()))?;
        if let Some(reason) = body
            .prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_deref())
        {
            warn!(block_reason = reason, "prompt blocked by service");
        }

        let text = extract_text(&body);
        debug!(response_bytes = text.len(), "generation completed");
        Ok(text)
    }
}

fn model_path(model: &str) -> String {
    if model.starts_with("models/") {
        model.to_string()
    } else {
        format!("models/{model}")
    }
}

fn build_request(prompt: &str, temperature: Option<f32>) -> GenerateContentRequest<'_> {
    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![Part { text: prompt }],
        }],
        generation_config: temperature.map(|temperature| GenerationConfig { temperature }),
    }
}

fn classify_status(status: StatusCode, retry_after: Option<u64>, body: &str) -> GenerationError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GenerationError::Authentication {
            status: status.as_u16(),
        },
        StatusCode::TOO_MANY_REQUESTS => GenerationError::RateLimited { retry_after },
        _ => GenerationError::Api {
            status: status.as_u16(),
            message: body.trim().chars().take(ERROR_BODY_LIMIT).collect(),
        },
    }
}

/// Concatenate the text parts of the first candidate; empty if there is none.
fn extract_text(response: &GenerateContentResponse) -> String {
    response
        .candidates
        .first()
        .and_then(|candidate| candidate.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|part| part.text.as_deref())
                .collect::<String>()
        })
        .unwrap_or_default()
}

// ============================================================================
// Gemini API types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}
