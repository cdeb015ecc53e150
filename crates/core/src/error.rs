//! Error types for the helpdesk assistant.
//!
//! This module defines a unified error enum that covers every failure class
//! of the answering pipeline: startup failures (configuration, catalog, index)
//! and per-query provider failures.

use thiserror::Error;

/// Unified error type for the helpdesk assistant.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
/// Startup variants (`Config`, `CatalogLoad`, `EmptyIndex`) are fatal; the
/// provider variants are recovered per query into a fallback reply.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed or unreadable FAQ source
    #[error("Catalog load error: {0}")]
    CatalogLoad(String),

    /// Index holds zero phrases
    #[error("Embedding index is empty: the FAQ catalog has no entries")]
    EmptyIndex,

    /// Embedding provider call failed
    #[error("Embedding provider error: {0}")]
    EmbeddingProvider(String),

    /// Sentiment provider call failed
    #[error("Sentiment provider error: {0}")]
    SentimentProvider(String),

    /// A provider call exceeded its time budget
    #[error("Provider timeout: {0}")]
    ProviderTimeout(String),

    /// Response template errors
    #[error("Template error: {0}")]
    Template(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Whether this error is a per-query failure the answering pipeline
    /// degrades into a fallback reply instead of propagating.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            AppError::EmbeddingProvider(_)
                | AppError::SentimentProvider(_)
                | AppError::ProviderTimeout(_)
                | AppError::EmptyIndex
        )
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
