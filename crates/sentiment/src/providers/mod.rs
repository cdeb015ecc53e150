//! Concrete sentiment provider implementations.

pub mod lexicon;
pub mod mock;
pub mod ollama;

pub use lexicon::LexiconProvider;
pub use mock::MockProvider;
pub use ollama::OllamaProvider;
