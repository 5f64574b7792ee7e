//! Worker thread implementation
//!
//! A worker owns one IO engine (and through it one descriptor), one aligned
//! buffer, one workload generator and one [`Meter`]. It runs a tight loop until
//! its deadline, timing only the transfer itself:
//!
//! ```text
//! next request -> seek if needed -> t0 -> read/write -> t1 -> meter += t1 - t0
//!              -> bogus computation -> (every 100 iterations) deadline check
//! ```
//!
//! Any engine error ends the loop with a fatal [`BenchError`]; there is no
//! partial result.
//!
//! # Example
//!
//! ```
//! use iostress::config::Config;
//! use iostress::engine::mock::MockEngine;
//! use iostress::worker::Worker;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let mut config = Config::new("/dev/null");
//! config.block_size = 4096;
//! config.offset_end = Some(1024);
//!
//! let worker = Worker::new(0, Arc::new(config), MockEngine::new(), 42).unwrap();
//! let meter = worker.run_for(Duration::from_millis(20)).unwrap();
//! assert!(meter.count >= 100);
//! ```

pub mod affinity;
pub mod workload;

use crate::config::Config;
use crate::engine::{IOEngine, OperationType};
use crate::error::BenchError;
use crate::stats::Meter;
use crate::util::buffer::AlignedBuffer;
use crate::util::fast_time::FastInstant;
use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use workload::{Direction, IoRequest, WorkloadGenerator};

/// Iterations between two deadline checks
const DURATION_CHECK_INTERVAL: u32 = 100;

/// Worker that drives one engine until its deadline
pub struct Worker<E: IOEngine> {
    id: usize,
    config: Arc<Config>,
    engine: E,
    workload: WorkloadGenerator,
    buffer: AlignedBuffer,
    meter: Meter,
    /// Byte position of the engine after the last transfer, if known
    position: Option<u64>,
}

impl<E: IOEngine> Worker<E> {
    /// Create worker `id` over `engine`
    ///
    /// `common_seed` is shared by all workers of a run; `config.offset_end`
    /// must already be resolved.
    pub fn new(
        id: usize,
        config: Arc<Config>,
        engine: E,
        common_seed: u64,
    ) -> Result<Self, BenchError> {
        let workload = WorkloadGenerator::new(&config, id, common_seed)?;
        let buffer = AlignedBuffer::for_block(config.block_size)?;

        Ok(Self {
            id,
            config,
            engine,
            workload,
            buffer,
            meter: Meter::new(),
            position: None,
        })
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Bind to the configured CPUs and run for the configured timeout
    pub fn run(self) -> Result<Meter, BenchError> {
        affinity::bind_worker(&self.config.affinity, self.id);
        let timeout = Duration::from_secs(self.config.timeout_secs);
        self.run_for(timeout)
    }

    /// Run the timed loop for `duration` and return the meter
    pub fn run_for(mut self, duration: Duration) -> Result<Meter, BenchError> {
        debug!("Worker {} started ({:?})", self.id, duration);

        let deadline = FastInstant::now_coarse().add_duration(duration);
        let bogus_comp = self.config.bogus_comp;

        'timed: loop {
            for _ in 0..DURATION_CHECK_INTERVAL {
                let request = self.workload.next_request();
                self.issue(request)?;
                bogus_compute(bogus_comp);
            }

            if FastInstant::now_coarse() >= deadline {
                break 'timed;
            }
        }

        debug!(
            "Worker {} finished: {} IOs, {:.6}s in IO",
            self.id, self.meter.count, self.meter.iowait_secs
        );

        Ok(self.meter)
    }

    /// Position the engine, transfer one block and account it
    #[inline(always)]
    fn issue(&mut self, request: IoRequest) -> Result<(), BenchError> {
        let address = request.address;

        if self.position != Some(address) {
            self.engine
                .seek(address)
                .map_err(|e| e.into_bench_error(self.id, address))?;
        }

        let start = FastInstant::now();
        let result = match request.direction {
            Direction::Read => self.engine.read_all(self.buffer.as_mut_slice()),
            Direction::Write => self.engine.write_all(self.buffer.as_slice()),
        };
        let elapsed = FastInstant::now().secs_since(start);

        if let Err(e) = result {
            self.position = None;
            return Err(e.into_bench_error(self.id, address));
        }

        self.meter.record(OperationType::from(request.direction), elapsed);
        self.position = Some(address + self.config.block_size);

        Ok(())
    }
}

/// Burn `iterations` loop steps of CPU work the optimizer cannot remove
#[inline(never)]
pub fn bogus_compute(iterations: u64) -> u64 {
    let mut acc = 0u64;
    for i in 0..iterations {
        acc = black_box(acc.wrapping_add(i));
    }
    acc
}
