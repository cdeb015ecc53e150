//! Scriptable sentiment provider for tests.

use crate::provider::SentimentProvider;
use helpdesk_core::{AppError, AppResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// Mock provider for testing.
///
/// Returns a fixed polarity for every text unless a per-text value was
/// registered. Counts calls, and can be switched into a failing or slow
/// mode to exercise error paths.
#[derive(Debug)]
pub struct MockProvider {
    polarity: f32,
    overrides: HashMap<String, f32>,
    calls: AtomicUsize,
    failing: AtomicBool,
    delay: Option<Duration>,
}

impl MockProvider {
    /// Create a mock that scores every text as `polarity`.
    pub fn new(polarity: f32) -> Self {
        Self {
            polarity,
            overrides: HashMap::new(),
            calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
            delay: None,
        }
    }

    /// A mock that scores everything as neutral.
    pub fn neutral() -> Self {
        Self::new(0.0)
    }

    /// Score `text` as `polarity` instead of the default.
    pub fn with_polarity(mut self, text: impl Into<String>, polarity: f32) -> Self {
        self.overrides.insert(text.into(), polarity);
        self
    }

    /// Sleep before answering every call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Make subsequent calls fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of texts scored so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl SentimentProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn polarity(&self, text: &str) -> AppResult<f32> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::SentimentProvider(
                "mock provider configured to fail".to_string(),
            ));
        }

        Ok(self.overrides.get(text).copied().unwrap_or(self.polarity))
    }
}
