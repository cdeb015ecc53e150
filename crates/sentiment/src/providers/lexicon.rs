//! Lexicon sentiment provider for local, offline operation.

use crate::provider::SentimentProvider;
use helpdesk_core::AppResult;
use std::collections::HashMap;
use unicode_segmentation::UnicodeSegmentation;

/// Word valences on the `[-1, 1]` polarity scale.
///
/// Support vocabulary such as "problem", "error" or "issue" is deliberately
/// absent: it describes the request, not the customer's mood.
const VALENCES: &[(&str, f32)] = &[
    // positive
    ("amazing", 0.9),
    ("appreciate", 0.5),
    ("awesome", 0.9),
    ("best", 0.8),
    ("better", 0.4),
    ("brilliant", 0.9),
    ("cool", 0.4),
    ("easy", 0.4),
    ("enjoy", 0.5),
    ("excellent", 0.9),
    ("fantastic", 0.9),
    ("fine", 0.2),
    ("friendly", 0.5),
    ("glad", 0.5),
    ("good", 0.6),
    ("great", 0.8),
    ("happy", 0.6),
    ("helpful", 0.6),
    ("love", 0.8),
    ("lovely", 0.7),
    ("nice", 0.5),
    ("perfect", 1.0),
    ("pleased", 0.5),
    ("quick", 0.3),
    ("satisfied", 0.5),
    ("thank", 0.4),
    ("thanks", 0.4),
    ("wonderful", 0.9),
    // negative
    ("angry", -0.7),
    ("annoyed", -0.5),
    ("annoying", -0.5),
    ("awful", -0.9),
    ("bad", -0.6),
    ("broken", -0.4),
    ("disappointed", -0.6),
    ("disappointing", -0.6),
    ("disgusting", -0.9),
    ("fail", -0.5),
    ("failed", -0.5),
    ("frustrated", -0.6),
    ("frustrating", -0.6),
    ("furious", -0.8),
    ("hate", -0.8),
    ("horrible", -0.9),
    ("incompetent", -0.8),
    ("mad", -0.6),
    ("nightmare", -0.8),
    ("outraged", -0.9),
    ("pathetic", -0.8),
    ("poor", -0.5),
    ("ridiculous", -0.6),
    ("rude", -0.6),
    ("sad", -0.5),
    ("scam", -0.9),
    ("slow", -0.3),
    ("stupid", -0.7),
    ("sucks", -0.7),
    ("terrible", -0.9),
    ("unacceptable", -0.8),
    ("unhappy", -0.6),
    ("upset", -0.6),
    ("useless", -0.7),
    ("waste", -0.6),
    ("worse", -0.6),
    ("worst", -1.0),
    ("wrong", -0.5),
];

/// Multipliers applied to the valence of the word that follows.
const INTENSIFIERS: &[(&str, f32)] = &[
    ("absolutely", 1.6),
    ("completely", 1.4),
    ("extremely", 1.8),
    ("incredibly", 1.6),
    ("quite", 1.2),
    ("really", 1.4),
    ("slightly", 0.5),
    ("so", 1.3),
    ("somewhat", 0.7),
    ("super", 1.4),
    ("totally", 1.4),
    ("very", 1.5),
];

const NEGATORS: &[&str] = &[
    "cannot", "neither", "never", "no", "nobody", "none", "nor", "not", "nothing", "without",
];

/// How many preceding words a negator reaches.
const NEGATION_WINDOW: usize = 3;

/// Negation flips polarity and weakens it ("not good" is milder than "bad").
const NEGATION_SCALAR: f32 = -0.5;

/// Valence-lexicon sentiment provider.
///
/// Scores each lexicon word, adjusted by a directly preceding intensifier and
/// by any negator in the preceding [`NEGATION_WINDOW`] words, and returns the
/// mean over scored words. Text without lexicon words scores `0.0`.
#[derive(Debug, Clone)]
pub struct LexiconProvider {
    valences: HashMap<&'static str, f32>,
    intensifiers: HashMap<&'static str, f32>,
}

impl LexiconProvider {
    pub fn new() -> Self {
        Self {
            valences: VALENCES.iter().copied().collect(),
            intensifiers: INTENSIFIERS.iter().copied().collect(),
        }
    }

    /// Score `text` synchronously.
    pub fn score(&self, text: &str) -> f32 {
        let words: Vec<String> = text
            .unicode_words()
            .map(|w| w.to_lowercase().replace('\u{2019}', "'"))
            .collect();

        let mut total = 0.0f32;
        let mut scored = 0usize;

        for (i, word) in words.iter().enumerate() {
            let Some(&valence) = self.valences.get(word.as_str()) else {
                continue;
            };

            let mut score = valence;

            if let Some(&boost) = i
                .checked_sub(1)
                .and_then(|prev| self.intensifiers.get(words[prev].as_str()))
            {
                score *= boost;
            }

            if words[i.saturating_sub(NEGATION_WINDOW)..i]
                .iter()
                .any(|w| is_negator(w))
            {
                score *= NEGATION_SCALAR;
            }

            total += score;
            scored += 1;
        }

        if scored == 0 {
            return 0.0;
        }

        (total / scored as f32).clamp(-1.0, 1.0)
    }
}

impl Default for LexiconProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn is_negator(word: &str) -> bool {
    NEGATORS.contains(&word) || word.ends_with("n't") || word == "dont" || word == "cant"
}

#[async_trait::async_trait]
impl SentimentProvider for LexiconProvider {
    fn provider_name(&self) -> &str {
        "lexicon"
    }

    async fn polarity(&self, text: &str) -> AppResult<f32> {
        Ok(self.score(text))
    }
}
