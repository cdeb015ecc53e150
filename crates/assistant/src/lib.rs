//! FAQ assistant pipeline.
//!
//! Wires the sentiment gate, retrieval engine and response renderer into
//! the `get_answer` entry point, and keeps per-session conversation logs.

pub mod assistant;
pub mod conversation;
pub mod policy;

// Re-export main types
pub use assistant::Assistant;
pub use conversation::{ConversationLog, ConversationTurn, SharedConversationLog, Speaker};
pub use policy::{FallbackReason, Outcome, QueryResult, Reply, ResponsePolicy};
