//! Run orchestration
//!
//! [`run_benchmark`] performs a whole run: it opens one descriptor per worker,
//! builds every worker before any thread starts (so configuration and open
//! errors surface with nothing running), spawns one named OS thread per worker,
//! joins them all and reduces their meters.
//!
//! The run's wall-clock time is measured from just before the first spawn to
//! just after the last join. There is no cancellation: a worker stops on its
//! own deadline, and a fatal IO error inside any worker terminates the process
//! with exit status 1 so no result is ever reported for a damaged run.

use crate::config::Config;
use crate::engine::sync::SyncEngine;
use crate::error::BenchError;
use crate::stats::{BenchResult, Meter, ResultAggregator};
use crate::target::{open_target, OpenFlags};
use crate::worker::affinity::warn_if_oversubscribed;
use crate::worker::Worker;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, error, info};

/// Common seed derived from the wall clock
pub fn seed_from_clock() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() ^ u64::from(d.subsec_nanos()))
        .unwrap_or(0)
}

/// Run the benchmark described by a validated, resolved configuration
///
/// Returns the reduced result, or [`BenchError::NoData`] if no IO completed.
/// Never returns after a fatal IO error: the process exits instead.
pub fn run_benchmark(config: &Config) -> Result<BenchResult, BenchError> {
    let config = Arc::new(config.clone());
    let (start_block, end_block) = config.block_range()?;
    let seed = config.seed.unwrap_or_else(seed_from_clock);

    debug!(
        "Window [{}, {}) blocks, seed {}, {} workers",
        start_block, end_block, seed, config.multiplicity
    );
    warn_if_oversubscribed(config.multiplicity);

    let workers = build_workers(&config, seed)?;

    info!(
        "Starting {} workers for {}s on {}",
        config.multiplicity,
        config.timeout_secs,
        config.path.display()
    );

    let start = Instant::now();

    let handles = start_workers(workers, spawn_worker)?;

    let mut aggregator = ResultAggregator::new(config.block_size);
    for (worker_id, handle) in handles.into_iter().enumerate() {
        let meter = handle
            .join()
            .map_err(|_| BenchError::WorkerPanicked(worker_id))?;
        aggregator.add_worker(worker_id, meter);
    }

    let exec_time = start.elapsed();
    debug!("All workers joined after {:.3}s", exec_time.as_secs_f64());

    aggregator.finish(exec_time)
}

/// Open one descriptor and build one worker per index
fn build_workers(config: &Arc<Config>, seed: u64) -> Result<Vec<Worker<SyncEngine>>, BenchError> {
    let flags = OpenFlags::for_mode(config.io_mode, config.direct);

    (0..config.multiplicity)
        .map(|id| {
            let file = open_target(&config.path, flags)?;
            Worker::new(id, Arc::clone(config), SyncEngine::new(file), seed)
        })
        .collect()
}

/// Start every worker with `spawn`
///
/// If a spawn fails, the threads already started are joined (they stop on
/// their own deadline) before the error is returned, so no worker outlives
/// the call.
fn start_workers<W, F>(workers: Vec<W>, mut spawn: F) -> Result<Vec<JoinHandle<Meter>>, BenchError>
where
    F: FnMut(W) -> Result<JoinHandle<Meter>, BenchError>,
{
    let mut handles = Vec::with_capacity(workers.len());

    for worker in workers {
        match spawn(worker) {
            Ok(handle) => handles.push(handle),
            Err(e) => {
                error!("{}; waiting for {} running workers to finish", e, handles.len());
                for handle in handles {
                    let _ = handle.join();
                }
                return Err(e);
            }
        }
    }

    Ok(handles)
}

/// Start `worker` on its own named thread
///
/// The thread body never returns an error: a fatal IO error is logged and the
/// whole process exits.
fn spawn_worker(worker: Worker<SyncEngine>) -> Result<JoinHandle<Meter>, BenchError> {
    let id = worker.id();

    std::thread::Builder::new()
        .name(format!("iostress-worker-{}", id))
        .spawn(move || match worker.run() {
            Ok(meter) => meter,
            Err(e) => {
                error!("{}", e);
                std::process::exit(1);
            }
        })
        .map_err(|source| BenchError::Spawn { worker: id, source })
}
