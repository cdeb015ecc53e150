//! Scriptable embedding provider for tests.

use crate::embeddings::provider::EmbeddingProvider;
use crate::embeddings::providers::trigram::TrigramProvider;
use helpdesk_core::{AppError, AppResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// Mock provider for testing.
///
/// Returns pinned vectors for registered texts and trigram vectors for
/// everything else. Counts every text it embeds, and can be switched into a
/// failing or slow mode to exercise error paths.
#[derive(Debug)]
pub struct MockProvider {
    dimensions: usize,
    pinned: HashMap<String, Vec<f32>>,
    fallback: TrigramProvider,
    calls: AtomicUsize,
    failing: AtomicBool,
    delay: Option<Duration>,
}

impl MockProvider {
    /// Create a new mock provider with specified dimensions.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            pinned: HashMap::new(),
            fallback: TrigramProvider::new(dimensions),
            calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
            delay: None,
        }
    }

    /// Pin the vector returned for `text`.
    pub fn with_vector(mut self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        self.pinned.insert(text.into(), vector);
        self
    }

    /// Sleep before answering every batch.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Make subsequent calls fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of texts embedded so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.calls.fetch_add(texts.len(), Ordering::SeqCst);

        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::EmbeddingProvider(
                "mock provider configured to fail".to_string(),
            ));
        }

        Ok(texts
            .iter()
            .map(|text| {
                self.pinned
                    .get(text)
                    .cloned()
                    .unwrap_or_else(|| self.fallback.embed_text(text))
            })
            .collect())
    }
}
