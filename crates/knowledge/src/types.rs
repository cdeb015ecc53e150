//! Knowledge system type definitions.

use serde::{Deserialize, Serialize};

/// One canonical question/answer pair with alternate phrasings.
///
/// Immutable once the catalog is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqEntry {
    /// Unique entry identifier
    pub id: String,

    /// Canonical question text
    pub question: String,

    /// Alternate phrasings, in source order
    #[serde(default)]
    pub variations: Vec<String>,

    /// Answer returned when this entry matches
    pub answer: String,
}

impl FaqEntry {
    /// Every phrase that represents this entry: the question first, then
    /// each variation in order.
    pub fn phrases(&self) -> impl Iterator<Item = (PhraseKind, &str)> {
        std::iter::once((PhraseKind::Question, self.question.as_str())).chain(
            self.variations
                .iter()
                .enumerate()
                .map(|(i, v)| (PhraseKind::Variation(i), v.as_str())),
        )
    }

    /// Number of phrases derived from this entry.
    pub fn phrase_count(&self) -> usize {
        1 + self.variations.len()
    }
}

/// A record as it appears in a catalog source, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqRecord {
    /// Optional explicit identifier; assigned positionally when absent
    #[serde(default)]
    pub id: Option<String>,

    pub question: String,

    #[serde(default)]
    pub variations: Vec<String>,

    pub answer: String,
}

/// Which part of an entry a phrase came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "position", rename_all = "snake_case")]
pub enum PhraseKind {
    Question,
    Variation(usize),
}

/// A question or variation together with its embedding.
#[derive(Debug, Clone, Serialize)]
pub struct IndexedPhrase {
    /// Phrase text, verbatim from the catalog
    pub phrase: String,

    /// Identifier of the owning entry
    pub entry_id: String,

    /// Question or variation
    pub kind: PhraseKind,

    /// Embedding vector
    #[serde(skip)]
    pub embedding: Vec<f32>,
}

/// Result of a nearest-neighbor lookup.
#[derive(Debug, Clone, Copy)]
pub struct Neighbor<'a> {
    /// The matched phrase
    pub phrase: &'a IndexedPhrase,

    /// Squared L2 distance to the query vector
    pub distance: f32,

    /// Insertion position of the phrase in the index
    pub position: usize,
}

/// Statistics about a built index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    /// Number of FAQ entries represented
    pub entries: usize,

    /// Number of indexed phrases
    pub phrases: usize,

    /// Embedding dimensions
    pub dimensions: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phrases_question_first() {
        let entry = FaqEntry {
            id: "hours".to_string(),
            question: "What are your support hours?".to_string(),
            variations: vec!["hours?".to_string(), "when are you open".to_string()],
            answer: "9am-5pm".to_string(),
        };

        let phrases: Vec<_> = entry.phrases().collect();
        assert_eq!(entry.phrase_count(), 3);
        assert_eq!(
            phrases,
            vec![
                (PhraseKind::Question, "What are your support hours?"),
                (PhraseKind::Variation(0), "hours?"),
                (PhraseKind::Variation(1), "when are you open"),
            ]
        );
    }

    #[test]
    fn test_record_variations_optional() {
        let record: FaqRecord =
            serde_json::from_str(r#"{"question": "Refunds?", "answer": "Within 30 days."}"#)
                .unwrap();
        assert!(record.id.is_none());
        assert!(record.variations.is_empty());
    }

    #[test]
    fn test_record_requires_answer() {
        let result = serde_json::from_str::<FaqRecord>(r#"{"question": "Refunds?"}"#);
        assert!(result.unwrap_err().to_string().contains("answer"));
    }

    #[test]
    fn test_phrase_kind_serialization() {
        let json = serde_json::to_value(PhraseKind::Variation(2)).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "variation", "position": 2}));
    }
}
