//! Acknowledgment phrase selection strategies.

use rand::Rng;

/// Chooses which of `count` phrases to use.
///
/// Returns `None` only when `count` is zero.
pub trait PhraseSelector: Send + Sync + std::fmt::Debug {
    fn select(&self, count: usize) -> Option<usize>;
}

/// Uniformly random choice.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSelector;

impl PhraseSelector for RandomSelector {
    fn select(&self, count: usize) -> Option<usize> {
        (count > 0).then(|| rand::thread_rng().gen_range(0..count))
    }
}

/// Always the first phrase.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstSelector;

impl PhraseSelector for FirstSelector {
    fn select(&self, count: usize) -> Option<usize> {
        (count > 0).then_some(0)
    }
}

/// Always the phrase at a fixed position, wrapping around short lists.
#[derive(Debug, Clone, Copy)]
pub struct FixedSelector(pub usize);

impl PhraseSelector for FixedSelector {
    fn select(&self, count: usize) -> Option<usize> {
        (count > 0).then(|| self.0 % count)
    }
}
