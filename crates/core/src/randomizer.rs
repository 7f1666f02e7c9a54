//! Randomizer - double-bag piece generation
//!
//! Each refill deals a bag of 14 cards, two of every kind, shuffled as one
//! deck. Any 14 draws that start at a refill boundary contain every kind
//! exactly twice, and the gap between two occurrences of the same kind is
//! bounded. Unlike a single 7-bag, a kind may repeat back to back.

use arrayvec::ArrayVec;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::types::PieceKind;

/// Cards in one refill
pub const BAG_SIZE: usize = 14;

/// Double-bag piece generator
#[derive(Debug, Clone)]
pub struct Randomizer<R = StdRng> {
    /// Undealt cards; drawn from the back
    bag: ArrayVec<PieceKind, BAG_SIZE>,
    rng: R,
}

impl Randomizer<StdRng> {
    /// Create a randomizer seeded from OS entropy
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Create a randomizer with a fixed seed (tests and benches)
    pub fn from_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for Randomizer<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> Randomizer<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            bag: ArrayVec::new(),
            rng,
        }
    }

    /// Deal the next piece kind, refilling when the bag is empty
    pub fn next(&mut self) -> PieceKind {
        loop {
            if let Some(kind) = self.bag.pop() {
                return kind;
            }
            self.refill();
        }
    }

    /// Discard every undealt card; the next draw starts a fresh bag
    pub fn reset(&mut self) {
        self.bag.clear();
    }

    /// Cards left before the next refill
    pub fn remaining(&self) -> usize {
        self.bag.len()
    }

    fn refill(&mut self) {
        self.bag.clear();
        for kind in PieceKind::ALL {
            self.bag.push(kind);
            self.bag.push(kind);
        }
        self.bag.shuffle(&mut self.rng);
    }
}
