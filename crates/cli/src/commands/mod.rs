//! Command handlers for the helpdesk CLI.
//!
//! This module organizes all CLI commands into separate submodules.

pub mod ask;
pub mod catalog;
pub mod chat;
pub mod sentiment;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use catalog::CatalogCommand;
pub use chat::ChatCommand;
pub use sentiment::SentimentCommand;
