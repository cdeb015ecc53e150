//! Query-to-entry matching.
//!
//! Embeds the query text, asks the index for the nearest phrase and resolves
//! that phrase back to the FAQ entry that owns it.

use crate::catalog::FaqCatalog;
use crate::embeddings::EmbeddingProvider;
use crate::types::{FaqEntry, Neighbor, PhraseKind};
use crate::vector_index::PhraseIndex;
use helpdesk_core::config::DEFAULT_PROVIDER_TIMEOUT_MS;
use helpdesk_core::{AppError, AppResult};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// An FAQ entry matched to a query.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalMatch {
    /// The owning entry
    pub entry: FaqEntry,

    /// Phrase that was closest to the query
    pub phrase: String,

    /// Whether the phrase was the question or a variation
    pub kind: PhraseKind,

    /// Squared L2 distance between query and phrase
    pub distance: f32,

    /// Insertion position of the phrase in the index
    pub position: usize,
}

/// Matches free-text queries against the catalog.
///
/// Holds shared handles only, so one engine can serve concurrent queries.
#[derive(Debug, Clone)]
pub struct RetrievalEngine {
    catalog: Arc<FaqCatalog>,
    index: Arc<dyn PhraseIndex>,
    embedder: Arc<dyn EmbeddingProvider>,
    max_distance: Option<f32>,
    timeout: Duration,
}

impl RetrievalEngine {
    /// Create an engine over a built index.
    ///
    /// # Errors
    /// - `AppError::EmptyIndex` if the index holds no phrases
    /// - `AppError::CatalogLoad` if an indexed phrase names an entry the
    ///   catalog does not contain
    pub fn new(
        catalog: Arc<FaqCatalog>,
        index: Arc<dyn PhraseIndex>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> AppResult<Self> {
        if index.phrases().is_empty() {
            return Err(AppError::EmptyIndex);
        }

        if let Some(orphan) = index
            .phrases()
            .iter()
            .find(|p| catalog.get(&p.entry_id).is_none())
        {
            return Err(AppError::CatalogLoad(format!(
                "Indexed phrase '{}' refers to unknown entry '{}'",
                orphan.phrase, orphan.entry_id
            )));
        }

        if index.stats().dimensions != embedder.dimensions() {
            return Err(AppError::EmbeddingProvider(format!(
                "Index has {} dimensions but provider '{}' produces {}",
                index.stats().dimensions,
                embedder.provider_name(),
                embedder.dimensions()
            )));
        }

        Ok(Self {
            catalog,
            index,
            embedder,
            max_distance: None,
            timeout: Duration::from_millis(DEFAULT_PROVIDER_TIMEOUT_MS),
        })
    }

    /// Treat matches farther than `max_distance` as no match.
    pub fn with_max_distance(mut self, max_distance: Option<f32>) -> Self {
        self.max_distance = max_distance;
        self
    }

    /// Bound each embedding call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn catalog(&self) -> &FaqCatalog {
        &self.catalog
    }

    pub fn index(&self) -> &dyn PhraseIndex {
        self.index.as_ref()
    }

    pub fn max_distance(&self) -> Option<f32> {
        self.max_distance
    }

    /// Find the entry whose question or variation is nearest to `query`.
    ///
    /// Returns `Ok(None)` only when a maximum distance is configured and the
    /// nearest phrase lies beyond it. Without one, a non-empty index always
    /// yields a match.
    #[instrument(skip(self, query), fields(query_len = query.len()))]
    pub async fn match_query(&self, query: &str) -> AppResult<Option<RetrievalMatch>> {
        let vector = self.embed_query(query).await?;
        let neighbor = self.index.nearest(&vector)?;

        debug!(
            phrase = %neighbor.phrase.phrase,
            entry = %neighbor.phrase.entry_id,
            distance = neighbor.distance,
            "Nearest phrase"
        );

        if let Some(max_distance) = self.max_distance {
            if neighbor.distance > max_distance {
                debug!(
                    "Nearest distance {:.4} exceeds maximum {:.4}, treating as no match",
                    neighbor.distance, max_distance
                );
                return Ok(None);
            }
        }

        self.resolve(neighbor).map(Some)
    }

    /// Up to `top_k` nearest phrases with their entries, closest first.
    ///
    /// Ignores the maximum distance so diagnostics can show what lies past it.
    pub async fn search(&self, query: &str, top_k: usize) -> AppResult<Vec<RetrievalMatch>> {
        let vector = self.embed_query(query).await?;

        self.index
            .search(&vector, top_k)?
            .into_iter()
            .map(|neighbor| self.resolve(neighbor))
            .collect()
    }

    async fn embed_query(&self, query: &str) -> AppResult<Vec<f32>> {
        tokio::time::timeout(self.timeout, self.embedder.embed(query))
            .await
            .map_err(|_| {
                AppError::ProviderTimeout(format!(
                    "Embedding provider '{}' did not answer within {}ms",
                    self.embedder.provider_name(),
                    self.timeout.as_millis()
                ))
            })?
    }

    fn resolve(&self, neighbor: Neighbor<'_>) -> AppResult<RetrievalMatch> {
        let entry = self.catalog.get(&neighbor.phrase.entry_id).ok_or_else(|| {
            AppError::Other(format!(
                "Index entry '{}' missing from catalog",
                neighbor.phrase.entry_id
            ))
        })?;

        Ok(RetrievalMatch {
            entry: entry.clone(),
            phrase: neighbor.phrase.phrase.clone(),
            kind: neighbor.phrase.kind,
            distance: neighbor.distance,
            position: neighbor.position,
        })
    }
}
