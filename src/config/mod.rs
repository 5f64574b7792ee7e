//! Configuration module
//!
//! Handles CLI argument parsing, TOML configuration files, and validation.
//! The benchmark core only ever sees a finished [`Config`]; it is built once,
//! validated, and then shared read-only by every worker.

pub mod cli;
pub mod cli_convert;
pub mod toml;
pub mod validator;
pub mod workload;

use crate::error::BenchError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use workload::*;

/// Sector size assumed for direct IO alignment checks
pub const DIRECT_IO_ALIGNMENT: u64 = 512;

/// Complete benchmark configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Block device or file to exercise
    #[serde(default)]
    pub path: PathBuf,
    /// Number of worker threads
    #[serde(default = "default_multiplicity")]
    pub multiplicity: usize,
    /// Sequential or random offsets
    #[serde(default)]
    pub access: AccessPattern,
    /// Read, write or mixed
    #[serde(default)]
    pub io_mode: IoMode,
    /// Bytes per IO operation
    #[serde(default = "default_block_size")]
    pub block_size: u64,
    /// First addressable block (inclusive)
    #[serde(default)]
    pub offset_start: u64,
    /// Last addressable block (exclusive); resolved from the target size when unset
    #[serde(default)]
    pub offset_end: Option<u64>,
    /// Byte offset added to every computed address
    #[serde(default)]
    pub misalign: u64,
    /// Wall-clock seconds each worker runs
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Dummy loop iterations executed after each IO
    #[serde(default)]
    pub bogus_comp: u64,
    /// Bypass the page cache (O_DIRECT)
    #[serde(default)]
    pub direct: bool,
    /// Per-worker CPU binding
    #[serde(default)]
    pub affinity: AffinityTable,
    /// Common seed for random streams; derived from the clock when unset
    #[serde(default)]
    pub seed: Option<u64>,
    /// Sequential wraparound behaviour
    #[serde(default)]
    pub sequential_wrap: WrapMode,
}

fn default_multiplicity() -> usize {
    1
}

fn default_block_size() -> u64 {
    64 * 1024
}

fn default_timeout() -> u64 {
    60
}

impl Config {
    /// Configuration with the tool's defaults for `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            multiplicity: default_multiplicity(),
            access: AccessPattern::default(),
            io_mode: IoMode::default(),
            block_size: default_block_size(),
            offset_start: 0,
            offset_end: None,
            misalign: 0,
            timeout_secs: default_timeout(),
            bogus_comp: 0,
            direct: false,
            affinity: AffinityTable::default(),
            seed: None,
            sequential_wrap: WrapMode::default(),
        }
    }

    /// Addressable block window `[offset_start, offset_end)`
    ///
    /// Fails if the end was never resolved, the window is empty, or the end of
    /// the window is not addressable once `misalign` is added.
    pub fn block_range(&self) -> Result<(u64, u64), BenchError> {
        let end = self.offset_end.ok_or_else(|| {
            BenchError::InvalidConfig("offset_end has not been resolved".to_string())
        })?;
        if self.offset_start >= end {
            return Err(BenchError::InvalidConfig(format!(
                "offset_start ({}) must be less than offset_end ({})",
                self.offset_start, end
            )));
        }
        if self.window_end_address().is_none() {
            return Err(BenchError::InvalidConfig(format!(
                "misalign {} overflows the address of block {}",
                self.misalign, end
            )));
        }
        Ok((self.offset_start, end))
    }

    /// Byte address just past the last block of the window, misalign included
    ///
    /// `None` if the end is unresolved or the address does not fit in a u64.
    /// Every address a worker issues, and the position after its transfer,
    /// is at most this value.
    pub fn window_end_address(&self) -> Option<u64> {
        self.offset_end?
            .checked_mul(self.block_size)?
            .checked_add(self.misalign)
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} x{} {} {} bs={} blocks=[{}, {}) misalign={} timeout={}s direct={}",
            self.path.display(),
            self.multiplicity,
            self.access,
            self.io_mode,
            self.block_size,
            self.offset_start,
            self.offset_end
                .map(|e| e.to_string())
                .unwrap_or_else(|| "auto".to_string()),
            self.misalign,
            self.timeout_secs,
            self.direct
        )
    }
}
