//! Mock IO engine for testing
//!
//! Simulates a target without touching the kernel. Every seek and transfer is
//! recorded so tests can check the exact addresses and directions a worker
//! issued. Clones share their state, so a test can keep a handle while the
//! worker owns the engine.
//!
//! # Example
//!
//! ```
//! use iostress::engine::IOEngine;
//! use iostress::engine::mock::MockEngine;
//!
//! let mut engine = MockEngine::new();
//! engine.fail_after(1);
//!
//! let mut buffer = [0u8; 512];
//! assert!(engine.read_all(&mut buffer).is_ok());
//! assert!(engine.read_all(&mut buffer).is_err());
//! ```

use super::{EngineError, IOEngine, OperationType};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Record of an issued operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRecord {
    pub op_type: OperationType,
    /// Byte position the operation started at
    pub offset: u64,
    /// Transfer length (0 for seeks)
    pub length: usize,
}

#[derive(Debug, Default)]
struct MockState {
    position: u64,
    transfers: u64,
    fail_after: Option<u64>,
    latency: Option<Duration>,
    ops: Vec<OperationRecord>,
}

/// Mock IO engine for testing
#[derive(Debug, Clone, Default)]
pub struct MockEngine {
    state: Arc<Mutex<MockState>>,
}

impl MockEngine {
    /// Engine that completes every operation instantly
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        // A panicking test thread must not hide the records from the others
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Let `count` transfers succeed, then stall every later one
    pub fn fail_after(&self, count: u64) {
        self.state().fail_after = Some(count);
    }

    /// Sleep for `latency` inside every transfer
    pub fn set_latency(&self, latency: Duration) {
        self.state().latency = Some(latency);
    }

    /// All operations issued so far, in order
    pub fn submitted_ops(&self) -> Vec<OperationRecord> {
        self.state().ops.clone()
    }

    /// Reads and writes issued so far (seeks excluded)
    pub fn transfer_count(&self) -> u64 {
        self.state().transfers
    }

    /// Number of seeks issued so far
    pub fn seek_count(&self) -> usize {
        self.state()
            .ops
            .iter()
            .filter(|op| op.op_type == OperationType::Seek)
            .count()
    }

    fn transfer(&self, op_type: OperationType, length: usize) -> Result<(), EngineError> {
        let latency = {
            let mut state = self.state();

            if state.fail_after.map_or(false, |limit| state.transfers >= limit) {
                return Err(EngineError::Stalled {
                    op: op_type,
                    expected: length,
                    transferred: 0,
                });
            }

            let offset = state.position;
            state.ops.push(OperationRecord {
                op_type,
                offset,
                length,
            });
            state.position += length as u64;
            state.transfers += 1;
            state.latency
        };

        if let Some(latency) = latency {
            std::thread::sleep(latency);
        }

        Ok(())
    }
}

impl IOEngine for MockEngine {
    fn seek(&mut self, offset: u64) -> Result<(), EngineError> {
        let mut state = self.state();
        state.position = offset;
        state.ops.push(OperationRecord {
            op_type: OperationType::Seek,
            offset,
            length: 0,
        });
        Ok(())
    }

    fn read_all(&mut self, buffer: &mut [u8]) -> Result<(), EngineError> {
        self.transfer(OperationType::Read, buffer.len())
    }

    fn write_all(&mut self, buffer: &[u8]) -> Result<(), EngineError> {
        self.transfer(OperationType::Write, buffer.len())
    }
}
