//! Nearest-neighbor index abstraction over FAQ phrase embeddings.
//!
//! Defines the read-only lookup contract the retrieval engine depends on,
//! plus the distance metric shared by every implementation.

use crate::types::{IndexStats, IndexedPhrase, Neighbor};
use helpdesk_core::AppResult;

/// Distances closer than this are treated as ties.
pub const TIE_EPSILON: f32 = 1e-6;

/// Trait for phrase index backends.
///
/// Implementations must:
/// - rank by ascending squared L2 distance
/// - break ties (within [`TIE_EPSILON`]) by lowest insertion position
/// - return `AppError::EmptyIndex` when holding zero phrases
/// - be safe to query concurrently once built
pub trait PhraseIndex: Send + Sync + std::fmt::Debug {
    /// The single closest phrase to the query vector.
    fn nearest(&self, query: &[f32]) -> AppResult<Neighbor<'_>>;

    /// Up to `top_k` closest phrases, closest first.
    fn search(&self, query: &[f32], top_k: usize) -> AppResult<Vec<Neighbor<'_>>>;

    /// Phrases in insertion order.
    fn phrases(&self) -> &[IndexedPhrase];

    /// Get statistics about the index.
    fn stats(&self) -> IndexStats;
}

/// Squared Euclidean distance between two vectors of equal length.
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_squared_l2() {
        assert_eq!(squared_l2(&[0.0, 0.0], &[3.0, 4.0]), 25.0);
        assert_eq!(squared_l2(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]), 0.0);
    }

    #[test]
    fn test_squared_l2_orthogonal_unit_vectors() {
        let d = squared_l2(&[1.0, 0.0], &[0.0, 1.0]);
        assert!((d - 2.0).abs() < 1e-6);
    }
}
