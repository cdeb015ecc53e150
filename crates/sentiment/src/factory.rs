//! Sentiment provider factory.
//!
//! Creates the configured provider once at startup so the gate can hold it
//! as a shared handle.

use crate::provider::SentimentProvider;
use crate::providers::ollama::{DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_URL};
use crate::providers::{LexiconProvider, OllamaProvider};
use helpdesk_core::config::SentimentSettings;
use helpdesk_core::{AppError, AppResult};
use std::sync::Arc;

/// Create a sentiment provider from configuration.
///
/// # Errors
/// - `AppError::Config` if the provider name is unknown
/// - `AppError::SentimentProvider` if the provider cannot be initialized
pub fn create_provider(settings: &SentimentSettings) -> AppResult<Arc<dyn SentimentProvider>> {
    match settings.provider.to_lowercase().as_str() {
        "lexicon" => Ok(Arc::new(LexiconProvider::new())),
        "ollama" => {
            let endpoint = settings.endpoint.as_deref().unwrap_or(DEFAULT_OLLAMA_URL);
            let model = settings.model.as_deref().unwrap_or(DEFAULT_OLLAMA_MODEL);
            tracing::debug!("Using Ollama sentiment model '{}' at {}", model, endpoint);
            Ok(Arc::new(OllamaProvider::new(endpoint, model)?))
        }
        other => Err(AppError::Config(format!(
            "Unknown sentiment provider: '{}'. Supported providers: lexicon, ollama",
            other
        ))),
    }
}
