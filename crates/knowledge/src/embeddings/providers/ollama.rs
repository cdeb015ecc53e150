//! Ollama Embedding Provider
//!
//! Produces semantic embeddings through a local Ollama server using models
//! like `nomic-embed-text`.
//!
//! Transient failures are retried here with exponential backoff; the
//! answering pipeline itself never retries.

use crate::embeddings::{EmbeddingConfig, EmbeddingProvider};
use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use helpdesk_core::{AppError, AppResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

const EMBEDDING_ENDPOINT: &str = "/api/embeddings";

/// Maximum attempts for one text
const MAX_RETRIES: u32 = 3;

/// Initial backoff duration in milliseconds
const INITIAL_BACKOFF_MS: u64 = 100;

/// Request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Ollama embedding provider using the local HTTP API.
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
    dimensions: usize,
    concurrency: usize,
}

#[derive(Debug, Clone, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorResponse {
    error: String,
}

impl OllamaProvider {
    /// Create a provider and verify the model answers with the configured
    /// dimensions.
    ///
    /// # Errors
    /// `AppError::EmbeddingProvider` if Ollama is unreachable or the model
    /// returns vectors of another size.
    pub async fn new(config: &EmbeddingConfig) -> AppResult<Self> {
        let provider = Self::unverified(config)?;
        provider.verify_connection().await?;
        Ok(provider)
    }

    fn unverified(config: &EmbeddingConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                AppError::EmbeddingProvider(format!("Failed to create HTTP client for Ollama: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            dimensions: config.dimensions,
            concurrency: config.concurrency.max(1),
        })
    }

    #[instrument(skip(self), fields(model = %self.model))]
    async fn verify_connection(&self) -> AppResult<()> {
        debug!("Verifying Ollama connection at {}", self.base_url);

        // Single attempt; a wrong model size fails the same way every time.
        match self.embed_single("test connection").await {
            Ok(_) => {
                debug!("Ollama model '{}' ready", self.model);
                Ok(())
            }
            Err(e) => {
                error!("Failed to connect to Ollama: {}", e);
                Err(AppError::EmbeddingProvider(format!(
                    "Ollama not usable at {} with model '{}': {}",
                    self.base_url, self.model, e
                )))
            }
        }
    }

    #[instrument(skip(self, text), fields(text_len = text.len()))]
    async fn embed_with_retries(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut attempt = 0;

        loop {
            match self.embed_single(text).await {
                Ok(embedding) => return Ok(embedding),
                Err(e) => {
                    attempt += 1;
                    if attempt >= MAX_RETRIES {
                        return Err(e);
                    }

                    let backoff_ms = INITIAL_BACKOFF_MS * 2_u64.pow(attempt);
                    warn!(
                        "Embedding failed (attempt {}/{}), retrying in {}ms: {}",
                        attempt, MAX_RETRIES, backoff_ms, e
                    );
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                }
            }
        }
    }

    async fn embed_single(&self, text: &str) -> AppResult<Vec<f32>> {
        let url = format!("{}{}", self.base_url, EMBEDDING_ENDPOINT);

        let request = EmbeddingRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                AppError::EmbeddingProvider(format!("Failed to send request to Ollama: {}", e))
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            let message = serde_json::from_str::<ErrorResponse>(&error_text)
                .map(|body| body.error)
                .unwrap_or(error_text);

            return Err(AppError::EmbeddingProvider(format!(
                "Ollama API error ({}): {}",
                status, message
            )));
        }

        let body: EmbeddingResponse = response.json().await.map_err(|e| {
            AppError::EmbeddingProvider(format!("Failed to parse Ollama response: {}", e))
        })?;

        if body.embedding.len() != self.dimensions {
            return Err(AppError::EmbeddingProvider(format!(
                "Unexpected embedding dimensions: got {}, expected {}",
                body.embedding.len(),
                self.dimensions
            )));
        }

        Ok(body.embedding)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    #[instrument(skip(self, texts), fields(batch_size = texts.len(), model = %self.model))]
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if let Some(i) = texts.iter().position(|t| t.trim().is_empty()) {
            return Err(AppError::EmbeddingProvider(format!(
                "Cannot embed empty text at position {}",
                i
            )));
        }

        // Ollama has no batch endpoint; `buffered` keeps results in input order.
        let requests: Vec<_> = texts
            .iter()
            .map(|text| self.embed_with_retries(text))
            .collect();
        stream::iter(requests)
            .buffered(self.concurrency)
            .try_collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer, dimensions: usize) -> EmbeddingConfig {
        EmbeddingConfig {
            provider: "ollama".to_string(),
            model: "nomic-embed-text".to_string(),
            dimensions,
            endpoint: server.uri(),
            concurrency: 2,
        }
    }

    #[tokio::test]
    async fn test_new_verifies_connection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(EMBEDDING_ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "embedding": [0.1, 0.2, 0.3]
            })))
            .mount(&server)
            .await;

        let provider = OllamaProvider::new(&config_for(&server, 3)).await.unwrap();
        assert_eq!(provider.provider_name(), "ollama");
        assert_eq!(provider.model_name(), "nomic-embed-text");

        let embedding = provider.embed("What are your support hours?").await.unwrap();
        assert_eq!(embedding, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn test_batch_preserves_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"prompt": "first"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"embedding": [1.0, 0.0]}))
                    .set_delay(Duration::from_millis(50)),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"prompt": "second"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"embedding": [0.0, 1.0]})))
            .mount(&server)
            .await;

        let provider = OllamaProvider::unverified(&config_for(&server, 2)).unwrap();
        let embeddings = provider
            .embed_batch(&["first".to_string(), "second".to_string()])
            .await
            .unwrap();

        assert_eq!(embeddings, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_fails_startup() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(EMBEDDING_ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "embedding": [0.1, 0.2]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = OllamaProvider::new(&config_for(&server, 768)).await.unwrap_err();
        assert!(matches!(err, AppError::EmbeddingProvider(_)));
        assert!(err.to_string().contains("got 2, expected 768"));
    }

    #[tokio::test]
    async fn test_server_error_is_retried_then_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(EMBEDDING_ENDPOINT))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "error": "model not found"
            })))
            .expect(u64::from(MAX_RETRIES))
            .mount(&server)
            .await;

        let provider = OllamaProvider::unverified(&config_for(&server, 3)).unwrap();
        let err = provider.embed("hello").await.unwrap_err();

        assert!(err.to_string().contains("model not found"));
    }

    #[tokio::test]
    async fn test_empty_text_rejected() {
        let server = MockServer::start().await;
        let provider = OllamaProvider::unverified(&config_for(&server, 3)).unwrap();

        assert!(provider.embed("   ").await.is_err());
    }
}
