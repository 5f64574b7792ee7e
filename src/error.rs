//! Error types for the benchmark core

use crate::engine::OperationType;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the benchmark core
///
/// Configuration problems surface before any worker starts. IO errors raised
/// inside a worker are fatal to the whole run; the orchestrator never turns
/// them into a partial result.
#[derive(Error, Debug)]
pub enum BenchError {
    /// Invalid configuration detected before any worker was spawned
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Target could not be opened for a worker
    #[error("Failed to open {}: {source}", path.display())]
    Open {
        /// Target path
        path: PathBuf,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// Seek, read or write syscall failed
    #[error("Worker {worker}: {op} failed at offset {offset}: {source}")]
    Io {
        /// Worker index
        worker: usize,
        /// Operation in progress (read, write or seek)
        op: OperationType,
        /// Byte address of the operation
        offset: u64,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// Transfer returned zero bytes before the block was complete
    #[error("Worker {worker}: short {op} at offset {offset}: {transferred} of {expected} bytes")]
    ShortTransfer {
        /// Worker index
        worker: usize,
        /// Operation in progress
        op: OperationType,
        /// Byte address of the operation
        offset: u64,
        /// Requested bytes
        expected: usize,
        /// Bytes moved before the transfer stalled
        transferred: usize,
    },

    /// Nothing was measured, so rates and means are undefined
    #[error("No data collected: zero IO operations completed")]
    NoData,

    /// The OS refused to create a worker thread
    #[error("Failed to spawn worker {worker}: {source}")]
    Spawn {
        /// Worker index
        worker: usize,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// Worker thread panicked before returning its meter
    #[error("Worker {0} panicked")]
    WorkerPanicked(usize),

    /// sched_setaffinity rejected the CPU list
    #[error("Failed to set CPU affinity to cores {cores:?}: {source}")]
    Affinity {
        /// Requested cores
        cores: Vec<usize>,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_transfer_message() {
        let err = BenchError::ShortTransfer {
            worker: 3,
            op: OperationType::Write,
            offset: 8192,
            expected: 4096,
            transferred: 512,
        };
        assert_eq!(
            err.to_string(),
            "Worker 3: short write at offset 8192: 512 of 4096 bytes"
        );
    }
}
