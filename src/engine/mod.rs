//! IO engine abstraction
//!
//! An IO engine owns one open target and moves exactly one block per call.
//! Workers are generic over [`IOEngine`], so the timed loop is the same whether
//! it drives a real descriptor ([`sync::SyncEngine`]) or a recording stand-in
//! ([`mock::MockEngine`]).
//!
//! # Transfer contract
//!
//! - `seek` positions the engine; the worker only calls it when the next
//!   address differs from the current position.
//! - `read_all` / `write_all` transfer the whole buffer at the current
//!   position, retrying short transfers, and advance the position by the
//!   buffer length.
//! - A transfer that stalls (zero bytes) or a failing syscall is reported as
//!   an [`EngineError`]; the worker turns it into a fatal [`BenchError`].
//!
//! # Example
//!
//! ```
//! use iostress::engine::{IOEngine, OperationType};
//! use iostress::engine::mock::MockEngine;
//!
//! let mut engine = MockEngine::new();
//! let mut buffer = vec![0u8; 4096];
//!
//! engine.seek(8192).unwrap();
//! engine.read_all(&mut buffer).unwrap();
//!
//! let ops = engine.submitted_ops();
//! assert_eq!(ops[1].op_type, OperationType::Read);
//! assert_eq!(ops[1].offset, 8192);
//! ```

use crate::error::BenchError;
use std::fmt;
use thiserror::Error;

/// Blocking, one-block-at-a-time IO engine
///
/// Engines must be `Send` so they can move onto the worker thread; each worker
/// owns its engine and its descriptor exclusively.
pub trait IOEngine: Send {
    /// Set the position of the next transfer to `offset` bytes
    fn seek(&mut self, offset: u64) -> Result<(), EngineError>;

    /// Fill `buffer` completely from the current position
    fn read_all(&mut self, buffer: &mut [u8]) -> Result<(), EngineError>;

    /// Write all of `buffer` at the current position
    fn write_all(&mut self, buffer: &[u8]) -> Result<(), EngineError>;
}

/// Operation type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    /// Read one block into the buffer
    Read,
    /// Write one block from the buffer
    Write,
    /// Reposition the file offset
    Seek,
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationType::Read => write!(f, "read"),
            OperationType::Write => write!(f, "write"),
            OperationType::Seek => write!(f, "seek"),
        }
    }
}

/// Engine-level failure, before worker context is attached
#[derive(Error, Debug)]
pub enum EngineError {
    /// The syscall returned -1
    #[error("{op} failed: {source}")]
    Os {
        op: OperationType,
        #[source]
        source: std::io::Error,
    },

    /// The syscall returned 0 before the buffer was complete
    #[error("{op} stalled after {transferred} of {expected} bytes")]
    Stalled {
        op: OperationType,
        expected: usize,
        transferred: usize,
    },
}

impl EngineError {
    /// Attach the worker index and byte address the operation was issued at
    pub fn into_bench_error(self, worker: usize, offset: u64) -> BenchError {
        match self {
            EngineError::Os { op, source } => BenchError::Io {
                worker,
                op,
                offset,
                source,
            },
            EngineError::Stalled {
                op,
                expected,
                transferred,
            } => BenchError::ShortTransfer {
                worker,
                op,
                offset,
                expected,
                transferred,
            },
        }
    }
}

pub mod mock;
pub mod sync;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_type_display() {
        assert_eq!(OperationType::Read.to_string(), "read");
        assert_eq!(OperationType::Write.to_string(), "write");
        assert_eq!(OperationType::Seek.to_string(), "seek");
    }

    #[test]
    fn test_into_bench_error_keeps_context() {
        let err = EngineError::Stalled {
            op: OperationType::Read,
            expected: 4096,
            transferred: 0,
        }
        .into_bench_error(2, 12288);

        match err {
            BenchError::ShortTransfer {
                worker,
                offset,
                expected,
                transferred,
                ..
            } => {
                assert_eq!((worker, offset, expected, transferred), (2, 12288, 4096, 0));
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = EngineError::Os {
            op: OperationType::Seek,
            source: std::io::Error::from_raw_os_error(libc::EINVAL),
        }
        .into_bench_error(0, 7);
        assert!(matches!(err, BenchError::Io { op: OperationType::Seek, .. }));
    }
}
