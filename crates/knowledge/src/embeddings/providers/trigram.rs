//! Trigram embedding provider using character trigram-based content-aware embeddings.

use crate::embeddings::provider::EmbeddingProvider;
use helpdesk_core::AppResult;
use std::collections::BTreeMap;

/// Words carrying no topical signal in support questions.
const STOP_WORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they", "them", "i", "me", "my", "you", "your", "we", "our", "do",
    "does", "can", "could", "please",
];

/// Trigram-based embedding provider for local, offline operation.
///
/// Generates deterministic embeddings from word and character-trigram
/// features hashed into a fixed number of buckets. Not semantically aware
/// like a neural model, but identical text always produces identical
/// vectors and texts sharing vocabulary land close together.
#[derive(Debug, Clone)]
pub struct TrigramProvider {
    dimensions: usize,
}

impl TrigramProvider {
    /// Create a new trigram provider with specified dimensions.
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    /// Generate a unit-length trigram embedding for text.
    ///
    /// Stop words are skipped unless the text has nothing else, so phrases
    /// like "Can you?" still embed distinctly. Text without any words maps
    /// to the zero vector.
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimensions];

        let lower = text.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        let content: Vec<&str> = words
            .iter()
            .copied()
            .filter(|w| !STOP_WORDS.contains(w))
            .collect();
        let features = if content.is_empty() { words } else { content };

        // Ordered map so float accumulation order is stable across runs.
        let mut word_freq: BTreeMap<&str, u32> = BTreeMap::new();
        for word in features {
            *word_freq.entry(word).or_insert(0) += 1;
        }

        for (word, freq) in &word_freq {
            // Boundary markers let short words contribute at least one trigram.
            let padded: Vec<char> = std::iter::once('^')
                .chain(word.chars())
                .chain(std::iter::once('$'))
                .collect();

            for window in padded.windows(3) {
                let hash = window.iter().fold(0u64, |acc, c| {
                    acc.wrapping_mul(37).wrapping_add(*c as u64)
                });
                let dim_idx = (hash % self.dimensions as u64) as usize;
                embedding[dim_idx] += (*freq as f32).sqrt();
            }

            // Also encode whole word
            let word_hash = word
                .bytes()
                .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
            let base_dim = (word_hash % self.dimensions as u64) as usize;
            embedding[base_dim] += *freq as f32;
        }

        // Normalize to unit vector
        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut embedding {
                *v /= norm;
            }
        }

        embedding
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for TrigramProvider {
    fn provider_name(&self) -> &str {
        "trigram"
    }

    fn model_name(&self) -> &str {
        "trigram-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_index::squared_l2;

    fn norm(v: &[f32]) -> f32 {
        v.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    #[tokio::test]
    async fn test_trigram_provider_dimensions() {
        let provider = TrigramProvider::new(384);
        assert_eq!(provider.dimensions(), 384);
        assert_eq!(provider.provider_name(), "trigram");
        assert_eq!(provider.model_name(), "trigram-v1");
    }

    #[tokio::test]
    async fn test_trigram_provider_embed_single() {
        let provider = TrigramProvider::new(384);
        let embedding = provider.embed("reset my password").await.unwrap();

        assert_eq!(embedding.len(), 384);
        assert!((norm(&embedding) - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_trigram_provider_embed_batch_preserves_order() {
        let provider = TrigramProvider::new(128);
        let texts = vec![
            "support hours".to_string(),
            "refund policy".to_string(),
            "reset password".to_string(),
        ];

        let embeddings = provider.embed_batch(&texts).await.unwrap();

        assert_eq!(embeddings.len(), 3);
        for (text, embedding) in texts.iter().zip(&embeddings) {
            assert_eq!(embedding, &provider.embed_text(text));
        }
    }

    #[tokio::test]
    async fn test_trigram_provider_deterministic() {
        let provider = TrigramProvider::new(384);
        let text = "When are you open on weekends?";

        let embedding1 = provider.embed(text).await.unwrap();
        let embedding2 = provider.embed(text).await.unwrap();

        assert_eq!(embedding1, embedding2);
    }

    #[test]
    fn test_punctuation_and_case_ignored() {
        let provider = TrigramProvider::new(256);
        assert_eq!(provider.embed_text("Hours?"), provider.embed_text("hours"));
    }

    #[test]
    fn test_shared_vocabulary_is_closer() {
        let provider = TrigramProvider::new(384);
        let query = provider.embed_text("how do I reset my password");
        let related = provider.embed_text("How can I reset my password?");
        let unrelated = provider.embed_text("Can I get a refund?");

        assert!(squared_l2(&query, &related) < squared_l2(&query, &unrelated));
    }

    #[test]
    fn test_text_without_words_is_zero_vector() {
        let provider = TrigramProvider::new(64);

        assert!(provider.embed_text("").iter().all(|&x| x == 0.0));
        assert!(provider.embed_text("?!").iter().all(|&x| x == 0.0));
    }

    #[test]
    fn test_stop_word_only_phrases_stay_distinct() {
        let provider = TrigramProvider::new(384);
        let can_you = provider.embed_text("Can you?");
        let do_you = provider.embed_text("Do you?");

        assert!((norm(&can_you) - 1.0).abs() < 0.001);
        assert!((norm(&do_you) - 1.0).abs() < 0.001);
        assert_ne!(can_you, do_you);

        // Content words still dominate when present.
        assert_eq!(
            provider.embed_text("is it the one?"),
            provider.embed_text("one")
        );
    }

    #[test]
    fn test_utf8_safety() {
        let provider = TrigramProvider::new(384);
        let embedding = provider.embed_text("¿Dónde está mi pedido? 📦");

        assert_eq!(embedding.len(), 384);
        assert!((norm(&embedding) - 1.0).abs() < 0.001);
    }
}
