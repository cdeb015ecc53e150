//! Sentiment provider abstraction.

use helpdesk_core::AppResult;

/// Trait for sentiment providers.
///
/// Implementations score text on a polarity scale where `-1.0` is maximally
/// negative and `1.0` maximally positive. Values outside that range are
/// clamped by the gate; NaN is treated as a provider failure.
#[async_trait::async_trait]
pub trait SentimentProvider: Send + Sync + std::fmt::Debug {
    /// Get the provider name (e.g., "lexicon", "ollama").
    fn provider_name(&self) -> &str;

    /// Score the emotional valence of `text`.
    async fn polarity(&self, text: &str) -> AppResult<f32>;
}
