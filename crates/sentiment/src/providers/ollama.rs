//! Ollama sentiment provider.
//!
//! Asks a local LLM to rate the polarity of a message and parses the number
//! out of its answer.
//! Ollama API: https://github.com/ollama/ollama/blob/main/docs/api.md

use crate::provider::SentimentProvider;
use helpdesk_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Ollama base URL
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Default model used for scoring
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2";

/// Request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 30;

const SYSTEM_PROMPT: &str = "You rate the sentiment of customer support messages. \
Reply with a single number between -1.0 (very negative) and 1.0 (very positive). \
Use 0.0 for neutral questions. Reply with the number only.";

/// Ollama API request format.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    system: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

/// Ollama API response format.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Sentiment provider backed by an Ollama completion model.
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaProvider {
    /// Create a provider for `model` served at `base_url`.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                AppError::SentimentProvider(format!("Failed to create HTTP client for Ollama: {}", e))
            })?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Extract the first number from a model answer such as `"-0.6"` or
/// `"Polarity: -0.6 (negative)"`.
fn parse_polarity(answer: &str) -> Option<f32> {
    answer
        .split(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
        .filter(|token| token.chars().any(|c| c.is_ascii_digit()))
        .find_map(|token| token.trim_end_matches('.').parse::<f32>().ok())
}

#[async_trait::async_trait]
impl SentimentProvider for OllamaProvider {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    async fn polarity(&self, text: &str) -> AppResult<f32> {
        tracing::debug!("Requesting polarity from Ollama model '{}'", self.model);

        let request = GenerateRequest {
            model: &self.model,
            prompt: format!("Message: {}\nPolarity:", text),
            system: SYSTEM_PROMPT,
            stream: false,
            options: GenerateOptions { temperature: 0.0 },
        };
        let url = format!("{}/api/generate", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                AppError::SentimentProvider(format!("Failed to send request to Ollama: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::SentimentProvider(format!(
                "Ollama API error ({}): {}",
                status, error_text
            )));
        }

        let body: GenerateResponse = response.json().await.map_err(|e| {
            AppError::SentimentProvider(format!("Failed to parse Ollama response: {}", e))
        })?;

        let polarity = parse_polarity(&body.response).ok_or_else(|| {
            AppError::SentimentProvider(format!(
                "Ollama answer contains no polarity: {:?}",
                body.response.trim()
            ))
        })?;

        Ok(polarity.clamp(-1.0, 1.0))
    }
}
