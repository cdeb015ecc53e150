//! Startup and the caller-facing entry points.

use crate::policy::{resolve_user, Reply, ResponsePolicy};
use helpdesk_core::{AppConfig, AppResult};
use helpdesk_knowledge::{FaqCatalog, IndexStats, RetrievalEngine, RetrievalMatch};
use helpdesk_responses::ResponseRenderer;
use helpdesk_sentiment::{Classification, SentimentGate};
use std::sync::Arc;
use std::time::Instant;

/// A ready-to-serve FAQ assistant.
///
/// Cheap to clone; clones share the same index and providers.
#[derive(Debug, Clone)]
pub struct Assistant {
    policy: Arc<ResponsePolicy>,
}

impl Assistant {
    pub fn new(gate: SentimentGate, engine: RetrievalEngine, renderer: ResponseRenderer) -> Self {
        Self {
            policy: Arc::new(ResponsePolicy::new(gate, engine, renderer)),
        }
    }

    /// Build everything described by configuration.
    ///
    /// Loads and indexes the catalog, creates both providers and compiles
    /// the response templates. Any error is a setup failure and no query
    /// should be served.
    pub async fn from_config(config: &AppConfig) -> AppResult<Self> {
        let start = Instant::now();
        config.validate()?;

        let renderer = helpdesk_responses::renderer_from_config(config)?;

        let sentiment = helpdesk_sentiment::create_provider(&config.sentiment)?;
        let gate = SentimentGate::from_settings(sentiment, &config.sentiment)
            .with_timeout(config.provider_timeout());

        let engine = helpdesk_knowledge::open(config).await?;

        let stats = engine.index().stats();
        tracing::info!(
            "Assistant ready: {} entries, {} phrases, sentiment via '{}' in {:.2}s",
            stats.entries,
            stats.phrases,
            gate.provider_name(),
            start.elapsed().as_secs_f64()
        );

        Ok(Self::new(gate, engine, renderer))
    }

    /// Answer `query` for `user_id` with full diagnostics.
    pub async fn respond(&self, query: &str, user_id: &str) -> Reply {
        self.policy.respond(query, user_id).await
    }

    /// Answer `query` for `user_id`.
    ///
    /// Always returns a message: provider failures become a fallback reply.
    pub async fn get_answer(&self, query: &str, user_id: &str) -> String {
        self.respond(query, user_id).await.text
    }

    /// Opening line for an interactive session.
    pub fn greeting(&self, user_id: &str) -> AppResult<String> {
        self.policy.renderer().greeting(resolve_user(user_id))
    }

    /// Closing line for an interactive session.
    pub fn goodbye(&self, user_id: &str) -> AppResult<String> {
        self.policy.renderer().goodbye(resolve_user(user_id))
    }

    /// Score a message without answering it.
    pub async fn classify(&self, text: &str) -> AppResult<Classification> {
        self.policy.gate().classify(text).await
    }

    /// Nearest catalog phrases for `query`, closest first.
    pub async fn search(&self, query: &str, top_k: usize) -> AppResult<Vec<RetrievalMatch>> {
        self.policy.engine().search(query, top_k).await
    }

    pub fn catalog(&self) -> &FaqCatalog {
        self.policy.engine().catalog()
    }

    pub fn stats(&self) -> IndexStats {
        self.policy.engine().index().stats()
    }
}
