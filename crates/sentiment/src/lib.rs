//! Sentiment scoring for incoming queries.
//!
//! Provides a provider-agnostic polarity trait, the providers selectable
//! from configuration, and the gate that decides whether a query should be
//! escalated to a human agent.
//!
//! # Providers
//! - **lexicon**: offline valence lexicon (default)
//! - **ollama**: asks a local LLM for a polarity score
//!
//! # Example
//! ```no_run
//! use helpdesk_sentiment::{providers::LexiconProvider, Sentiment, SentimentGate};
//! use std::sync::Arc;
//!
//! # async fn example() -> helpdesk_core::AppResult<()> {
//! let gate = SentimentGate::new(Arc::new(LexiconProvider::new()));
//! let classification = gate.classify("I am furious with your service").await?;
//! assert_eq!(classification.sentiment, Sentiment::Negative);
//! # Ok(())
//! # }
//! ```

pub mod factory;
pub mod gate;
pub mod provider;
pub mod providers;

// Re-export main types
pub use factory::create_provider;
pub use gate::{Classification, Sentiment, SentimentGate};
pub use provider::SentimentProvider;
