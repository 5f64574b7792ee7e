//! Per-worker workload generation
//!
//! Decides, for every iteration, the byte address and direction of the next IO.
//! Offsets come from a [`Distribution`]; the direction is either fixed for the
//! whole run or drawn per iteration from a second private stream when the run
//! is mixed.
//!
//! Both streams derive from `common_seed + worker_id`, so a run is repeatable
//! for a fixed common seed while no two workers share a stream.

use crate::config::workload::{AccessPattern, IoMode};
use crate::config::Config;
use crate::distribution::{
    sequential::SequentialDistribution, uniform::UniformDistribution, Distribution,
};
use crate::engine::OperationType;
use crate::error::BenchError;
use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Direction of a single transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Read,
    Write,
}

impl From<Direction> for OperationType {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Read => OperationType::Read,
            Direction::Write => OperationType::Write,
        }
    }
}

/// The next IO a worker should issue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoRequest {
    /// Byte address including misalignment
    pub address: u64,
    pub direction: Direction,
}

enum DirectionPicker {
    Fixed(Direction),
    Mixed {
        write_ratio: f64,
        rng: Xoshiro256PlusPlus,
    },
}

impl DirectionPicker {
    #[inline(always)]
    fn next(&mut self) -> Direction {
        match self {
            DirectionPicker::Fixed(direction) => *direction,
            DirectionPicker::Mixed { write_ratio, rng } => {
                if rng.gen::<f64>() < *write_ratio {
                    Direction::Write
                } else {
                    Direction::Read
                }
            }
        }
    }
}

/// Seed of worker `worker_id`'s private streams
#[inline]
pub fn worker_seed(common_seed: u64, worker_id: usize) -> u64 {
    common_seed.wrapping_add(worker_id as u64)
}

/// Workload generator owned by one worker
pub struct WorkloadGenerator {
    distribution: Box<dyn Distribution>,
    direction: DirectionPicker,
    block_size: u64,
    misalign: u64,
}

impl WorkloadGenerator {
    /// Build the generator for `worker_id`
    ///
    /// `config.offset_end` must already be resolved.
    pub fn new(config: &Config, worker_id: usize, common_seed: u64) -> Result<Self, BenchError> {
        let (start, end) = config.block_range()?;
        let seed = worker_seed(common_seed, worker_id);

        let distribution: Box<dyn Distribution> = match config.access {
            AccessPattern::Sequential => Box::new(SequentialDistribution::new(
                start,
                end,
                worker_id,
                config.multiplicity,
                config.sequential_wrap,
            )),
            AccessPattern::Random => Box::new(UniformDistribution::with_seed(seed, start, end)),
        };

        let direction = match config.io_mode {
            IoMode::Read => DirectionPicker::Fixed(Direction::Read),
            IoMode::Write => DirectionPicker::Fixed(Direction::Write),
            IoMode::Mixed { .. } if config.access == AccessPattern::Sequential => {
                return Err(BenchError::InvalidConfig(
                    "mixed read/write cannot be combined with sequential access".to_string(),
                ));
            }
            IoMode::Mixed { write_ratio } => {
                // Same seed, jumped 2^128 steps ahead, so it never overlaps the offset stream
                let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
                rng.jump();
                DirectionPicker::Mixed { write_ratio, rng }
            }
        };

        Ok(Self {
            distribution,
            direction,
            block_size: config.block_size,
            misalign: config.misalign,
        })
    }

    /// Next (address, direction) pair
    #[inline(always)]
    pub fn next_request(&mut self) -> IoRequest {
        let block = self.distribution.next_block();
        IoRequest {
            address: block * self.block_size + self.misalign,
            direction: self.direction.next(),
        }
    }
}
