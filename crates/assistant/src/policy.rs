//! Per-query response policy.
//!
//! Each query ends in exactly one terminal state:
//! - `Escalate` when the message is negative; retrieval is skipped
//! - `Answer` when retrieval finds an entry
//! - `Fallback` on an empty query, a match beyond the distance limit or any
//!   provider failure
//!
//! Nothing here panics or propagates per-query errors; failures become a
//! well-formed fallback reply.

use helpdesk_core::AppError;
use helpdesk_knowledge::{FaqEntry, RetrievalEngine};
use helpdesk_responses::{ResponseRenderer, DEFAULT_USER};
use helpdesk_sentiment::{Sentiment, SentimentGate};
use serde::Serialize;
use tracing::{debug, instrument, warn};

/// Why a query ended in the fallback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// Query was empty or whitespace
    EmptyQuery,

    /// Nearest entry was beyond the configured maximum distance
    NoMatch,

    /// Index holds no phrases
    EmptyIndex,

    /// Embedding or sentiment provider failed
    ProviderFailure,

    /// Embedding or sentiment provider did not answer in time
    ProviderTimeout,

    /// Anything else, such as a template rendering error
    Internal,
}

impl From<&AppError> for FallbackReason {
    fn from(error: &AppError) -> Self {
        match error {
            AppError::EmptyIndex => Self::EmptyIndex,
            AppError::ProviderTimeout(_) => Self::ProviderTimeout,
            AppError::EmbeddingProvider(_) | AppError::SentimentProvider(_) => {
                Self::ProviderFailure
            }
            _ => Self::Internal,
        }
    }
}

/// Terminal state reached by a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Outcome {
    Escalate,
    Answer { entry_id: String, distance: f32 },
    Fallback { reason: FallbackReason },
}

impl Outcome {
    pub fn is_escalation(&self) -> bool {
        matches!(self, Self::Escalate)
    }

    pub fn is_answer(&self) -> bool {
        matches!(self, Self::Answer { .. })
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// Diagnostics for one query. Produced per request and never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    /// Sentiment class, if the gate produced one
    pub sentiment: Option<Sentiment>,

    /// Clamped polarity, if the gate produced one
    pub polarity: Option<f32>,

    /// Entry the query was matched to
    pub matched_entry: Option<FaqEntry>,

    /// Phrase of the matched entry nearest to the query
    pub matched_phrase: Option<String>,

    /// Squared L2 distance between query and matched phrase
    pub score: Option<f32>,
}

/// The bot's reply to one query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    pub text: String,
    pub outcome: Outcome,
    pub result: QueryResult,
}

/// Runs the sentiment gate, retrieval and rendering for one query.
#[derive(Debug, Clone)]
pub struct ResponsePolicy {
    gate: SentimentGate,
    engine: RetrievalEngine,
    renderer: ResponseRenderer,
}

impl ResponsePolicy {
    pub fn new(gate: SentimentGate, engine: RetrievalEngine, renderer: ResponseRenderer) -> Self {
        Self {
            gate,
            engine,
            renderer,
        }
    }

    pub fn gate(&self) -> &SentimentGate {
        &self.gate
    }

    pub fn engine(&self) -> &RetrievalEngine {
        &self.engine
    }

    pub fn renderer(&self) -> &ResponseRenderer {
        &self.renderer
    }

    /// Produce the reply for `query` from `user_id`.
    ///
    /// An empty `user_id` is treated as [`DEFAULT_USER`].
    #[instrument(skip_all, fields(query_len = query.len()))]
    pub async fn respond(&self, query: &str, user_id: &str) -> Reply {
        let user_id = resolve_user(user_id);
        let query = query.trim();
        let mut result = QueryResult::default();

        if query.is_empty() {
            debug!("Empty query");
            return self.fallback(user_id, FallbackReason::EmptyQuery, result);
        }

        debug!(query, "Handling query");

        let classification = match self.gate.classify(query).await {
            Ok(classification) => classification,
            Err(e) => {
                warn!("Sentiment check failed, falling back: {}", e);
                return self.fallback(user_id, FallbackReason::from(&e), result);
            }
        };

        result.sentiment = Some(classification.sentiment);
        result.polarity = Some(classification.polarity);

        if classification.sentiment == Sentiment::Negative {
            debug!(polarity = classification.polarity, "Escalating");
            let text = self
                .renderer
                .escalation(user_id)
                .unwrap_or_else(|e| {
                    warn!("Failed to render escalation: {}", e);
                    format!(
                        "I understand this might be frustrating, {}. Let me escalate your request to a human agent.",
                        user_id
                    )
                });

            return Reply {
                text,
                outcome: Outcome::Escalate,
                result,
            };
        }

        let matched = match self.engine.match_query(query).await {
            Ok(Some(matched)) => matched,
            Ok(None) => return self.fallback(user_id, FallbackReason::NoMatch, result),
            Err(e) => {
                warn!("Retrieval failed, falling back: {}", e);
                return self.fallback(user_id, FallbackReason::from(&e), result);
            }
        };

        let outcome = Outcome::Answer {
            entry_id: matched.entry.id.clone(),
            distance: matched.distance,
        };

        let rendered = self
            .renderer
            .answer(user_id, &matched.entry.question, &matched.entry.answer);

        result.score = Some(matched.distance);
        result.matched_phrase = Some(matched.phrase);
        result.matched_entry = Some(matched.entry);

        match rendered {
            Ok(text) => {
                debug!(?outcome, "Answering");
                Reply {
                    text,
                    outcome,
                    result,
                }
            }
            Err(e) => {
                warn!("Failed to render answer, falling back: {}", e);
                self.fallback(user_id, FallbackReason::from(&e), result)
            }
        }
    }

    fn fallback(&self, user_id: &str, reason: FallbackReason, result: QueryResult) -> Reply {
        debug!(?reason, "Falling back");

        let text = self.renderer.fallback(user_id).unwrap_or_else(|e| {
            warn!("Failed to render fallback: {}", e);
            format!(
                "I'm sorry, {}. I don't have an answer for that. Let me connect you with an agent.",
                user_id
            )
        });

        Reply {
            text,
            outcome: Outcome::Fallback { reason },
            result,
        }
    }
}

/// The name to address the user by.
pub fn resolve_user(user_id: &str) -> &str {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        DEFAULT_USER
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_reason_from_error() {
        assert_eq!(
            FallbackReason::from(&AppError::EmptyIndex),
            FallbackReason::EmptyIndex
        );
        assert_eq!(
            FallbackReason::from(&AppError::ProviderTimeout("slow".into())),
            FallbackReason::ProviderTimeout
        );
        assert_eq!(
            FallbackReason::from(&AppError::SentimentProvider("down".into())),
            FallbackReason::ProviderFailure
        );
        assert_eq!(
            FallbackReason::from(&AppError::Template("bad".into())),
            FallbackReason::Internal
        );
    }

    #[test]
    fn test_resolve_user() {
        assert_eq!(resolve_user(""), "Guest");
        assert_eq!(resolve_user("   "), "Guest");
        assert_eq!(resolve_user(" Ada "), "Ada");
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = Outcome::Answer {
            entry_id: "faq-1".to_string(),
            distance: 0.5,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["state"], "answer");
        assert_eq!(json["entry_id"], "faq-1");

        let json = serde_json::to_value(Outcome::Fallback {
            reason: FallbackReason::NoMatch,
        })
        .unwrap();
        assert_eq!(json["reason"], "no_match");
    }
}
