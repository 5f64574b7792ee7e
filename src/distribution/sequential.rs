//! Sequential block generation
//!
//! Worker `id` of `multiplicity` starts at
//! `start + (end - start) * id / multiplicity`, so the initial cursors split the
//! window into contiguous, non-overlapping sub-ranges. What happens at the end
//! of a lap is decided by [`WrapMode`].

use crate::config::workload::WrapMode;
use crate::distribution::Distribution;

/// First block of worker `id`'s sub-range
#[inline]
pub fn partition_start(start: u64, end: u64, id: usize, multiplicity: usize) -> u64 {
    let span = (end - start) as u128;
    start + (span * id as u128 / multiplicity.max(1) as u128) as u64
}

/// Sequential block generator
///
/// Yields `first, first + 1, ...` until `limit`, then jumps back to `restart`.
/// With [`WrapMode::Global`] the limit is the window end and the restart point
/// is the window start; with [`WrapMode::Partition`] both are the bounds of the
/// worker's own sub-range.
#[derive(Debug)]
pub struct SequentialDistribution {
    current_block: u64,
    restart: u64,
    limit: u64,
}

impl SequentialDistribution {
    /// Cursor for worker `id` over `[start, end)`
    pub fn new(start: u64, end: u64, id: usize, multiplicity: usize, wrap: WrapMode) -> Self {
        debug_assert!(start < end);
        let first = partition_start(start, end, id, multiplicity);

        let (restart, limit) = match wrap {
            WrapMode::Global => (start, end),
            WrapMode::Partition => {
                let next = partition_start(start, end, id + 1, multiplicity).min(end);
                // More workers than blocks: keep at least one block
                (first, next.max(first + 1))
            }
        };

        Self {
            current_block: first,
            restart,
            limit,
        }
    }
}

impl Distribution for SequentialDistribution {
    #[inline(always)]
    fn next_block(&mut self) -> u64 {
        if self.current_block >= self.limit {
            self.current_block = self.restart;
        }

        let block = self.current_block;
        self.current_block += 1;
        block
    }
}
