//! Embedding providers for FAQ phrases and user queries.
//!
//! Provides a provider-agnostic trait, its configuration, and the concrete
//! providers selectable from configuration.

pub mod config;
pub mod provider;
pub mod providers;

pub use config::EmbeddingConfig;
pub use provider::{create_provider, EmbeddingProvider};
