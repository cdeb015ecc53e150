//! Escalation decision based on message polarity.

use crate::provider::SentimentProvider;
use helpdesk_core::config::{SentimentSettings, DEFAULT_ESCALATION_THRESHOLD, DEFAULT_PROVIDER_TIMEOUT_MS};
use helpdesk_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Coarse sentiment class used by the response policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Negative,
    NeutralOrPositive,
}

/// Outcome of classifying one message.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub sentiment: Sentiment,

    /// Provider polarity, clamped to `[-1, 1]`
    pub polarity: f32,
}

/// Classifies messages as negative or not.
///
/// A message is negative when its polarity is strictly below the threshold.
/// The provider is called once per message with no retries.
#[derive(Debug, Clone)]
pub struct SentimentGate {
    provider: Arc<dyn SentimentProvider>,
    threshold: f32,
    timeout: Duration,
}

impl SentimentGate {
    pub fn new(provider: Arc<dyn SentimentProvider>) -> Self {
        Self {
            provider,
            threshold: DEFAULT_ESCALATION_THRESHOLD,
            timeout: Duration::from_millis(DEFAULT_PROVIDER_TIMEOUT_MS),
        }
    }

    /// Build a gate using the configured threshold.
    pub fn from_settings(provider: Arc<dyn SentimentProvider>, settings: &SentimentSettings) -> Self {
        Self::new(provider).with_threshold(settings.escalation_threshold)
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Bound each provider call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    /// Map a polarity onto a sentiment class.
    pub fn decide(&self, polarity: f32) -> Sentiment {
        if polarity < self.threshold {
            Sentiment::Negative
        } else {
            Sentiment::NeutralOrPositive
        }
    }

    /// Score `text` and classify it.
    ///
    /// # Errors
    /// - `AppError::ProviderTimeout` if the provider exceeds the timeout
    /// - `AppError::SentimentProvider` if the provider fails or returns NaN
    pub async fn classify(&self, text: &str) -> AppResult<Classification> {
        let polarity = tokio::time::timeout(self.timeout, self.provider.polarity(text))
            .await
            .map_err(|_| {
                AppError::ProviderTimeout(format!(
                    "Sentiment provider '{}' did not answer within {}ms",
                    self.provider.provider_name(),
                    self.timeout.as_millis()
                ))
            })??;

        if polarity.is_nan() {
            return Err(AppError::SentimentProvider(format!(
                "Sentiment provider '{}' returned NaN",
                self.provider.provider_name()
            )));
        }

        let polarity = polarity.clamp(-1.0, 1.0);
        let sentiment = self.decide(polarity);

        tracing::debug!(polarity, ?sentiment, "Classified message");

        Ok(Classification {
            sentiment,
            polarity,
        })
    }
}
