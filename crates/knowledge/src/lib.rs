//! FAQ knowledge base.
//!
//! Loads the FAQ catalog, embeds every question and variation into a flat
//! index and matches user queries back to catalog entries.

pub mod catalog;
pub mod embeddings;
pub mod index;
pub mod retrieval;
pub mod types;
pub mod vector_index;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use catalog::{CatalogFormat, FaqCatalog};
pub use embeddings::{create_provider, EmbeddingConfig, EmbeddingProvider};
pub use index::EmbeddingIndex;
pub use retrieval::{RetrievalEngine, RetrievalMatch};
pub use types::{FaqEntry, FaqRecord, IndexStats, IndexedPhrase, Neighbor, PhraseKind};
pub use vector_index::{squared_l2, PhraseIndex};

use helpdesk_core::{AppConfig, AppResult};
use std::sync::Arc;
use std::time::Instant;

/// Load the configured catalog and build a retrieval engine over it.
///
/// This is the whole startup path: any error returned here means no query
/// can be served.
pub async fn open(config: &AppConfig) -> AppResult<RetrievalEngine> {
    let start = Instant::now();
    let catalog_path = config.catalog_path();

    tracing::info!("Loading FAQ catalog from {}", catalog_path.display());
    let catalog = Arc::new(FaqCatalog::load(&catalog_path)?);

    let embedding_config = EmbeddingConfig::from_settings(&config.embedding)?;
    let embedder = create_provider(&embedding_config).await?;

    open_with(catalog, embedder, config).await.inspect(|_| {
        tracing::debug!(
            "Knowledge base ready in {:.2}s",
            start.elapsed().as_secs_f64()
        );
    })
}

/// Build a retrieval engine from an already loaded catalog and provider.
pub async fn open_with(
    catalog: Arc<FaqCatalog>,
    embedder: Arc<dyn EmbeddingProvider>,
    config: &AppConfig,
) -> AppResult<RetrievalEngine> {
    let index = EmbeddingIndex::build(&catalog, embedder.as_ref()).await?;

    Ok(RetrievalEngine::new(catalog, Arc::new(index), embedder)?
        .with_max_distance(config.policy.max_distance)
        .with_timeout(config.provider_timeout()))
}
