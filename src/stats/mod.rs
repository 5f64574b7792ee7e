//! Statistics collection
//!
//! Each worker owns one [`Meter`] and is the only writer to it; the
//! orchestrator reads it once, after joining the worker. There are no atomics
//! and no locks on the measurement path.
//!
//! # Example
//!
//! ```
//! use iostress::stats::Meter;
//! use iostress::engine::OperationType;
//!
//! let mut meter = Meter::new();
//! meter.record(OperationType::Read, 0.000_100);
//! meter.record(OperationType::Write, 0.000_150);
//!
//! assert_eq!(meter.count, 2);
//! assert_eq!(meter.reads + meter.writes, meter.count);
//! ```

pub mod aggregator;

use crate::engine::OperationType;
use serde::{Deserialize, Serialize};

pub use aggregator::{reduce, ResultAggregator};

/// Per-worker IO counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Meter {
    /// Seconds spent inside IO calls
    pub iowait_secs: f64,
    /// Completed IOs
    pub count: u64,
    /// Completed reads
    pub reads: u64,
    /// Completed writes
    pub writes: u64,
}

impl Meter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account one completed transfer that took `elapsed_secs`
    #[inline(always)]
    pub fn record(&mut self, op: OperationType, elapsed_secs: f64) {
        self.iowait_secs += elapsed_secs;
        self.count += 1;
        match op {
            OperationType::Read => self.reads += 1,
            OperationType::Write => self.writes += 1,
            OperationType::Seek => {}
        }
    }

    /// Add another meter's counters into this one
    pub fn merge(&mut self, other: &Meter) {
        self.iowait_secs += other.iowait_secs;
        self.count += other.count;
        self.reads += other.reads;
        self.writes += other.writes;
    }

    /// Mean seconds per IO, `None` if nothing completed
    pub fn mean_response_secs(&self) -> Option<f64> {
        (self.count > 0).then(|| self.iowait_secs / self.count as f64)
    }
}

/// Final result of a run
///
/// Built once by the orchestrator after every worker has been joined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchResult {
    /// Wall-clock seconds from before spawning until after the last join
    pub exec_time_secs: f64,
    /// Number of workers
    pub workers: usize,
    /// Bytes per IO
    pub block_size: u64,
    /// Total completed IOs
    pub count: u64,
    /// Total completed reads
    pub reads: u64,
    /// Total completed writes
    pub writes: u64,
    /// Sum of all workers' IO wait
    pub accum_iowait_secs: f64,
    /// Mean IO wait per worker
    pub iowait_secs: f64,
    /// Mean seconds per IO
    pub response_time_secs: f64,
    /// Completed IOs per second
    pub iops: f64,
    /// Bytes per second
    pub bandwidth: f64,
    /// Per-worker meters, indexed by worker id
    pub meters: Vec<Meter>,
}
