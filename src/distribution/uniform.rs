//! Uniform random distribution
//!
//! Every block of the window is equally likely. Uses the xoshiro256++ PRNG,
//! which is cheap enough to call once per IO and seedable, so a worker's
//! offset stream is repeatable for a fixed seed.

use super::Distribution;
use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Uniform random distribution over `[start, end)`
pub struct UniformDistribution {
    rng: Xoshiro256PlusPlus,
    start: u64,
    end: u64,
}

impl UniformDistribution {
    /// Create a distribution whose stream is fully determined by `seed`
    pub fn with_seed(seed: u64, start: u64, end: u64) -> Self {
        debug_assert!(start < end);
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
            start,
            end,
        }
    }
}

impl Distribution for UniformDistribution {
    #[inline(always)]
    fn next_block(&mut self) -> u64 {
        self.rng.gen_range(self.start..self.end)
    }
}
