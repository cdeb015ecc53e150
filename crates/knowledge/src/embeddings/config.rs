//! Embedding configuration types.

use helpdesk_core::config::EmbeddingSettings;
use helpdesk_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Default Ollama base URL.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Model used when the Ollama provider is selected without an explicit model.
pub const DEFAULT_OLLAMA_MODEL: &str = "nomic-embed-text";

const TRIGRAM_MODEL: &str = "trigram-v1";

/// Resolved embedding configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// Provider name: "trigram", "ollama"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Base URL for HTTP providers
    pub endpoint: String,

    /// Maximum number of in-flight requests when embedding a batch
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_concurrency() -> usize {
    4
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "trigram".to_string(),
            model: TRIGRAM_MODEL.to_string(),
            dimensions: 384,
            endpoint: DEFAULT_OLLAMA_URL.to_string(),
            concurrency: default_concurrency(),
        }
    }
}

impl EmbeddingConfig {
    /// Resolve provider settings from the application config.
    pub fn from_settings(settings: &EmbeddingSettings) -> AppResult<Self> {
        if settings.dimensions == 0 {
            return Err(AppError::Config(
                "Embedding dimensions must be greater than zero".to_string(),
            ));
        }

        // The default model name belongs to the trigram provider.
        let model = if settings.provider == "ollama" && settings.model == TRIGRAM_MODEL {
            DEFAULT_OLLAMA_MODEL.to_string()
        } else {
            settings.model.clone()
        };

        Ok(Self {
            provider: settings.provider.clone(),
            model,
            dimensions: settings.dimensions,
            endpoint: settings
                .endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            concurrency: default_concurrency(),
        })
    }
}
