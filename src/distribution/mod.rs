//! Block offset generators
//!
//! A distribution yields block indices inside the configured window
//! `[offset_start, offset_end)`. The worker turns a block index into a byte
//! address with `block * block_size + misalign`.
//!
//! # Distributions
//!
//! - **Sequential**: per-worker contiguous cursor with wraparound
//! - **Uniform**: seeded xoshiro256++ draw over the whole window
//!
//! # Example
//!
//! ```
//! use iostress::distribution::{Distribution, uniform::UniformDistribution};
//!
//! let mut dist = UniformDistribution::with_seed(7, 100, 1124);
//! let block = dist.next_block();
//! assert!((100..1124).contains(&block));
//! ```

/// Block index generator owned by a single worker
///
/// Distributions must be `Send` so they can move onto the worker thread. Each
/// worker owns its own instance; nothing is shared on the hot path.
pub trait Distribution: Send {
    /// Next block index, always inside the window the distribution was built for
    fn next_block(&mut self) -> u64;
}

pub mod sequential;
pub mod uniform;
