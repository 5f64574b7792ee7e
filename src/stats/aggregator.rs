//! Reduction of per-worker meters into the run result
//!
//! The reduction is a plain fold: counts and wait times are summed, then
//! divided by the run's wall-clock time, the worker count, or the total count.
//! Any of those divisors being zero means nothing was measured, which is
//! reported as [`BenchError::NoData`] rather than an infinite or NaN rate.
//!
//! # Example
//!
//! ```
//! use iostress::stats::{Meter, aggregator::ResultAggregator};
//! use std::time::Duration;
//!
//! let mut aggregator = ResultAggregator::new(4096);
//! aggregator.add_worker(0, Meter { iowait_secs: 1.0, count: 500, reads: 500, writes: 0 });
//! aggregator.add_worker(1, Meter { iowait_secs: 1.0, count: 500, reads: 500, writes: 0 });
//!
//! let result = aggregator.finish(Duration::from_secs(1)).unwrap();
//! assert_eq!(result.iops, 1000.0);
//! ```

use super::{BenchResult, Meter};
use crate::error::BenchError;
use std::collections::BTreeMap;
use std::time::Duration;

/// Collects worker meters as workers are joined
#[derive(Debug)]
pub struct ResultAggregator {
    block_size: u64,
    workers: BTreeMap<usize, Meter>,
}

impl ResultAggregator {
    pub fn new(block_size: u64) -> Self {
        Self {
            block_size,
            workers: BTreeMap::new(),
        }
    }

    /// Store the meter of a joined worker
    pub fn add_worker(&mut self, worker_id: usize, meter: Meter) {
        self.workers.insert(worker_id, meter);
    }

    /// Build the result for a run that took `exec_time`
    pub fn finish(self, exec_time: Duration) -> Result<BenchResult, BenchError> {
        let meters: Vec<Meter> = self.workers.into_values().collect();
        reduce(meters, self.block_size, exec_time.as_secs_f64())
    }
}

/// Reduce per-worker meters into the run result
///
/// - `iops = count / exec`
/// - `bandwidth = count * block_size / exec`
/// - `iowait = sum(wait) / workers`
/// - `response_time = sum(wait) / count`
pub fn reduce(
    meters: Vec<Meter>,
    block_size: u64,
    exec_time_secs: f64,
) -> Result<BenchResult, BenchError> {
    let mut total = Meter::new();
    for meter in &meters {
        total.merge(meter);
    }

    if total.count == 0 || meters.is_empty() || exec_time_secs.is_nan() || exec_time_secs <= 0.0 {
        return Err(BenchError::NoData);
    }

    let count = total.count as f64;

    Ok(BenchResult {
        exec_time_secs,
        workers: meters.len(),
        block_size,
        count: total.count,
        reads: total.reads,
        writes: total.writes,
        accum_iowait_secs: total.iowait_secs,
        iowait_secs: total.iowait_secs / meters.len() as f64,
        response_time_secs: total.iowait_secs / count,
        iops: count / exec_time_secs,
        bandwidth: count * block_size as f64 / exec_time_secs,
        meters,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meter(count: u64, wait: f64) -> Meter {
        Meter {
            iowait_secs: wait,
            count,
            reads: count,
            writes: 0,
        }
    }

    #[test]
    fn test_reduce_iops() {
        let meters = vec![meter(1000, 1.0); 4];
        let result = reduce(meters, 4096, 2.0).unwrap();

        assert_eq!(result.count, 4000);
        assert!((result.iops - 2000.0).abs() < 1e-9);
        assert_eq!(result.workers, 4);
    }

    #[test]
    fn test_reduce_bandwidth() {
        let meters = vec![meter(1200, 0.6), meter(800, 0.4)];
        let result = reduce(meters, 65536, 2.0).unwrap();

        assert!((result.bandwidth - 65_536_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_reduce_wait_times() {
        let meters = vec![meter(100, 1.0), meter(300, 3.0)];
        let result = reduce(meters, 512, 4.0).unwrap();

        assert!((result.accum_iowait_secs - 4.0).abs() < 1e-12);
        assert!((result.iowait_secs - 2.0).abs() < 1e-12);
        assert!((result.response_time_secs - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_reduce_no_data() {
        assert!(matches!(
            reduce(vec![Meter::new(); 3], 4096, 1.0),
            Err(BenchError::NoData)
        ));
        assert!(matches!(reduce(vec![], 4096, 1.0), Err(BenchError::NoData)));
        assert!(matches!(
            reduce(vec![meter(10, 0.1)], 4096, 0.0),
            Err(BenchError::NoData)
        ));
    }

    #[test]
    fn test_aggregator_orders_workers() {
        let mut aggregator = ResultAggregator::new(4096);
        aggregator.add_worker(2, meter(3, 0.3));
        aggregator.add_worker(0, meter(1, 0.1));
        aggregator.add_worker(1, meter(2, 0.2));

        let result = aggregator.finish(Duration::from_secs(3)).unwrap();
        let counts: Vec<u64> = result.meters.iter().map(|m| m.count).collect();
        assert_eq!(counts, vec![1, 2, 3]);
        assert_eq!(result.workers, 3);
        assert_eq!(result.count, 6);
        assert!((result.iops - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_reduce_mixed_directions() {
        let meters = vec![
            Meter { iowait_secs: 0.5, count: 10, reads: 7, writes: 3 },
            Meter { iowait_secs: 0.5, count: 10, reads: 4, writes: 6 },
        ];
        let result = reduce(meters, 4096, 1.0).unwrap();
        assert_eq!(result.reads, 11);
        assert_eq!(result.writes, 9);
    }
}
