//! Flat embedding index over every FAQ question and variation.
//!
//! Built once at startup and read-only afterwards. Lookups are a linear
//! scan, which is adequate at FAQ-catalog scale and trivially deterministic.

use crate::catalog::FaqCatalog;
use crate::embeddings::EmbeddingProvider;
use crate::types::{IndexStats, IndexedPhrase, Neighbor};
use crate::vector_index::{squared_l2, PhraseIndex, TIE_EPSILON};
use helpdesk_core::{AppError, AppResult};
use std::collections::HashSet;
use std::time::Instant;

/// Linear-scan nearest-neighbor index.
#[derive(Debug, Clone)]
pub struct EmbeddingIndex {
    phrases: Vec<IndexedPhrase>,
    dimensions: usize,
    entries: usize,
}

impl EmbeddingIndex {
    /// Embed every question and variation of the catalog.
    ///
    /// Phrases are indexed in catalog order: each entry's question, then its
    /// variations.
    ///
    /// # Errors
    /// - `AppError::EmptyIndex` if the catalog has no entries
    /// - `AppError::EmbeddingProvider` if any phrase cannot be embedded or
    ///   comes back malformed; no phrase is ever skipped
    pub async fn build(catalog: &FaqCatalog, provider: &dyn EmbeddingProvider) -> AppResult<Self> {
        if catalog.is_empty() {
            return Err(AppError::EmptyIndex);
        }

        let start = Instant::now();

        let mut texts = Vec::with_capacity(catalog.phrase_count());
        let mut owners = Vec::with_capacity(catalog.phrase_count());
        for entry in catalog.entries() {
            for (kind, phrase) in entry.phrases() {
                texts.push(phrase.to_string());
                owners.push((entry.id.clone(), kind));
            }
        }

        tracing::info!(
            "Embedding {} phrases using provider '{}' (model: {})",
            texts.len(),
            provider.provider_name(),
            provider.model_name()
        );

        let embeddings = provider.embed_batch(&texts).await?;

        if embeddings.len() != texts.len() {
            return Err(AppError::EmbeddingProvider(format!(
                "Provider returned {} embeddings for {} phrases",
                embeddings.len(),
                texts.len()
            )));
        }

        let phrases = texts
            .into_iter()
            .zip(owners)
            .zip(embeddings)
            .map(|((phrase, (entry_id, kind)), embedding)| IndexedPhrase {
                phrase,
                entry_id,
                kind,
                embedding,
            })
            .collect();

        let index = Self::from_phrases(phrases, provider.dimensions())?;

        tracing::info!(
            "Built embedding index: {} entries, {} phrases, {} dimensions in {:.2}s",
            index.entries,
            index.phrases.len(),
            index.dimensions,
            start.elapsed().as_secs_f64()
        );

        Ok(index)
    }

    /// Assemble an index from already-embedded phrases.
    ///
    /// Every vector must have `dimensions` finite components.
    pub fn from_phrases(phrases: Vec<IndexedPhrase>, dimensions: usize) -> AppResult<Self> {
        if phrases.is_empty() {
            return Err(AppError::EmptyIndex);
        }

        for phrase in &phrases {
            check_vector(&phrase.embedding, dimensions).map_err(|reason| {
                AppError::EmbeddingProvider(format!(
                    "Invalid embedding for phrase '{}': {}",
                    phrase.phrase, reason
                ))
            })?;
        }

        let entries = phrases
            .iter()
            .map(|p| p.entry_id.as_str())
            .collect::<HashSet<_>>()
            .len();

        Ok(Self {
            phrases,
            dimensions,
            entries,
        })
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Closest phrase not yet marked in `taken`.
    fn scan(&self, query: &[f32], taken: &[bool]) -> Option<(usize, f32)> {
        let mut best: Option<(usize, f32)> = None;

        for (position, phrase) in self.phrases.iter().enumerate() {
            if taken[position] {
                continue;
            }

            let distance = squared_l2(query, &phrase.embedding);
            match best {
                // Strictly closer by more than epsilon; earlier phrases win ties.
                Some((_, best_distance)) if distance >= best_distance - TIE_EPSILON => {}
                _ => best = Some((position, distance)),
            }
        }

        best
    }

    fn check_query(&self, query: &[f32]) -> AppResult<()> {
        if self.phrases.is_empty() {
            return Err(AppError::EmptyIndex);
        }

        check_vector(query, self.dimensions)
            .map_err(|reason| AppError::EmbeddingProvider(format!("Invalid query vector: {}", reason)))
    }

    fn neighbor(&self, position: usize, distance: f32) -> Neighbor<'_> {
        Neighbor {
            phrase: &self.phrases[position],
            distance,
            position,
        }
    }
}

impl PhraseIndex for EmbeddingIndex {
    fn nearest(&self, query: &[f32]) -> AppResult<Neighbor<'_>> {
        self.check_query(query)?;

        let taken = vec![false; self.phrases.len()];
        let (position, distance) = self.scan(query, &taken).ok_or(AppError::EmptyIndex)?;

        Ok(self.neighbor(position, distance))
    }

    fn search(&self, query: &[f32], top_k: usize) -> AppResult<Vec<Neighbor<'_>>> {
        self.check_query(query)?;

        // Repeated selection keeps the ranking consistent with `nearest`,
        // including its tie-break.
        let mut taken = vec![false; self.phrases.len()];
        let mut results = Vec::with_capacity(top_k.min(self.phrases.len()));

        while results.len() < top_k {
            let Some((position, distance)) = self.scan(query, &taken) else {
                break;
            };
            taken[position] = true;
            results.push(self.neighbor(position, distance));
        }

        Ok(results)
    }

    fn phrases(&self) -> &[IndexedPhrase] {
        &self.phrases
    }

    fn stats(&self) -> IndexStats {
        IndexStats {
            entries: self.entries,
            phrases: self.phrases.len(),
            dimensions: self.dimensions,
        }
    }
}

fn check_vector(vector: &[f32], dimensions: usize) -> Result<(), String> {
    if vector.len() != dimensions {
        return Err(format!(
            "expected {} dimensions, got {}",
            dimensions,
            vector.len()
        ));
    }

    if vector.iter().any(|x| !x.is_finite()) {
        return Err("contains non-finite values".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogFormat;
    use crate::embeddings::providers::{MockProvider, TrigramProvider};
    use crate::types::{FaqEntry, PhraseKind};

    fn phrase(text: &str, entry_id: &str, embedding: Vec<f32>) -> IndexedPhrase {
        IndexedPhrase {
            phrase: text.to_string(),
            entry_id: entry_id.to_string(),
            kind: PhraseKind::Question,
            embedding,
        }
    }

    fn support_catalog() -> FaqCatalog {
        FaqCatalog::parse(
            r#"[
                {"id": "hours", "question": "What are your support hours?",
                 "variations": ["hours?", "when are you open"], "answer": "9am-5pm"},
                {"id": "password", "question": "How can I reset my password?",
                 "variations": ["forgot password"], "answer": "Use the reset link."},
                {"id": "refund", "question": "Can I get a refund?", "answer": "Within 30 days."}
            ]"#,
            CatalogFormat::Json,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_build_indexes_every_phrase_in_order() {
        let catalog = support_catalog();
        let index = EmbeddingIndex::build(&catalog, &TrigramProvider::new(128))
            .await
            .unwrap();

        let owners: Vec<_> = index
            .phrases()
            .iter()
            .map(|p| (p.entry_id.as_str(), p.kind))
            .collect();
        assert_eq!(
            owners,
            vec![
                ("hours", PhraseKind::Question),
                ("hours", PhraseKind::Variation(0)),
                ("hours", PhraseKind::Variation(1)),
                ("password", PhraseKind::Question),
                ("password", PhraseKind::Variation(0)),
                ("refund", PhraseKind::Question),
            ]
        );
        assert_eq!(
            index.stats(),
            IndexStats {
                entries: 3,
                phrases: 6,
                dimensions: 128
            }
        );
    }

    #[tokio::test]
    async fn test_build_empty_catalog_fails() {
        let catalog = FaqCatalog::default();
        let err = EmbeddingIndex::build(&catalog, &TrigramProvider::new(16))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EmptyIndex));
    }

    #[tokio::test]
    async fn test_build_propagates_provider_failure() {
        let provider = MockProvider::new(16);
        provider.set_failing(true);

        let err = EmbeddingIndex::build(&support_catalog(), &provider)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EmbeddingProvider(_)));
    }

    #[tokio::test]
    async fn test_build_rejects_wrong_dimensions() {
        let provider = MockProvider::new(3).with_vector("hours?", vec![1.0, 0.0]);

        let err = EmbeddingIndex::build(&support_catalog(), &provider)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("hours?"));
    }

    #[tokio::test]
    async fn test_self_retrieval() {
        let catalog = support_catalog();
        let index = EmbeddingIndex::build(&catalog, &TrigramProvider::new(384))
            .await
            .unwrap();
        let provider = TrigramProvider::new(384);

        for entry in catalog.entries() {
            for (_, text) in entry.phrases() {
                let neighbor = index.nearest(&provider.embed_text(text)).unwrap();
                assert_eq!(neighbor.phrase.entry_id, entry.id, "phrase {:?}", text);
                assert!(neighbor.distance < TIE_EPSILON);
            }
        }
    }

    #[tokio::test]
    async fn test_single_entry_always_answers() {
        let catalog = FaqCatalog::from_entries(vec![FaqEntry {
            id: "only".to_string(),
            question: "What are your support hours?".to_string(),
            variations: Vec::new(),
            answer: "9am-5pm".to_string(),
        }])
        .unwrap();
        let provider = TrigramProvider::new(64);
        let index = EmbeddingIndex::build(&catalog, &provider).await.unwrap();

        let neighbor = index
            .nearest(&provider.embed_text("completely unrelated question about llamas"))
            .unwrap();
        assert_eq!(neighbor.phrase.entry_id, "only");
    }

    #[test]
    fn test_nearest_tie_breaks_by_insertion_order() {
        let index = EmbeddingIndex::from_phrases(
            vec![
                phrase("far", "a", vec![0.0, 5.0]),
                phrase("first", "b", vec![1.0, 0.0]),
                phrase("second", "c", vec![-1.0, 0.0]),
            ],
            2,
        )
        .unwrap();

        // Both "first" and "second" are at distance 1 from the origin.
        let neighbor = index.nearest(&[0.0, 0.0]).unwrap();
        assert_eq!(neighbor.phrase.phrase, "first");
        assert_eq!(neighbor.position, 1);
        assert!((neighbor.distance - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_nearest_is_idempotent() {
        let index = EmbeddingIndex::from_phrases(
            vec![
                phrase("x", "a", vec![1.0, 0.0]),
                phrase("y", "b", vec![0.0, 1.0]),
            ],
            2,
        )
        .unwrap();

        let query = [0.5, 0.5];
        let first = index.nearest(&query).unwrap().position;
        for _ in 0..10 {
            assert_eq!(index.nearest(&query).unwrap().position, first);
        }
    }

    #[test]
    fn test_search_ranks_by_distance() {
        let index = EmbeddingIndex::from_phrases(
            vec![
                phrase("far", "a", vec![0.0, 5.0]),
                phrase("near", "b", vec![1.0, 0.0]),
                phrase("mid", "c", vec![2.0, 0.0]),
            ],
            2,
        )
        .unwrap();

        let results = index.search(&[1.0, 0.0], 2).unwrap();
        let names: Vec<_> = results.iter().map(|n| n.phrase.phrase.as_str()).collect();
        assert_eq!(names, vec!["near", "mid"]);

        let all = index.search(&[1.0, 0.0], 10).unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].phrase.phrase, "far");
    }

    #[test]
    fn test_query_dimension_mismatch() {
        let index =
            EmbeddingIndex::from_phrases(vec![phrase("x", "a", vec![1.0, 0.0])], 2).unwrap();

        let err = index.nearest(&[1.0, 0.0, 0.0]).unwrap_err();
        assert!(matches!(err, AppError::EmbeddingProvider(_)));
    }

    #[test]
    fn test_non_finite_vectors_rejected() {
        let result = EmbeddingIndex::from_phrases(vec![phrase("x", "a", vec![f32::NAN, 0.0])], 2);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_no_phrases_is_empty_index() {
        let err = EmbeddingIndex::from_phrases(Vec::new(), 2).unwrap_err();
        assert!(matches!(err, AppError::EmptyIndex));
    }
}
