//! Deterministic permutation source keyed by an integer seed.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Seeded stream of shuffles.
///
/// Every call to [`SeededSequence::permute`] advances the same underlying
/// `StdRng`, so the n-th permutation drawn from a given seed is always the
/// same. Negative seeds are reinterpreted bit-for-bit as `u64`.
#[derive(Debug, Clone)]
pub struct SeededSequence {
    rng: StdRng,
}

impl SeededSequence {
    pub fn new(seed: i64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed as u64),
        }
    }

    /// Returns a uniformly shuffled copy of `items` (Fisher-Yates).
    pub fn permute<T: Copy, const N: usize>(&mut self, items: [T; N]) -> [T; N] {
        let mut shuffled = items;
        shuffled.shuffle(&mut self.rng);
        shuffled
    }
}
