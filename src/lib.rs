//! iostress - raw storage microbenchmark
//!
//! iostress drives a configurable number of worker threads against a block device
//! or file, each issuing fixed-size blocking reads or writes under a sequential or
//! random access pattern for a bounded wall-clock duration, and reduces the
//! per-worker counters into aggregate throughput and latency figures.
//!
//! # Architecture
//!
//! - **Configuration**: immutable, validated run parameters (`config`)
//! - **Workload generation**: per-worker offset and direction selection (`worker::workload`)
//! - **IO driver**: complete, short-transfer-safe blocking IO (`engine`)
//! - **Workers**: one thread, one descriptor, one meter each (`worker`)
//! - **Orchestrator**: spawn, join, reduce (`coordinator`)

pub mod config;
pub mod coordinator;
pub mod distribution;
pub mod engine;
pub mod error;
pub mod output;
pub mod stats;
pub mod target;
pub mod util;
pub mod worker;

// Re-export commonly used types
pub use config::Config;
pub use coordinator::run_benchmark;
pub use engine::IOEngine;
pub use error::BenchError;
pub use stats::{BenchResult, Meter};
