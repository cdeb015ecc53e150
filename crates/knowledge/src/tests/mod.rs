//! Cross-module tests for catalog loading, indexing and retrieval.
