//! Workload definition structures

use serde::{Deserialize, Serialize};
use std::fmt;

/// Access pattern type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AccessPattern {
    Sequential,
    Random,
}

impl Default for AccessPattern {
    fn default() -> Self {
        Self::Sequential
    }
}

/// IO direction selection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum IoMode {
    /// Every operation is a read
    Read,
    /// Every operation is a write
    Write,
    /// Each operation is a write with probability `write_ratio`
    Mixed { write_ratio: f64 },
}

impl Default for IoMode {
    fn default() -> Self {
        Self::Read
    }
}

impl IoMode {
    /// Build a mixed mode, clamping the ratio into [0, 1]
    pub fn mixed(write_ratio: f64) -> Self {
        let write_ratio = if write_ratio.is_nan() {
            0.0
        } else {
            write_ratio.clamp(0.0, 1.0)
        };
        Self::Mixed { write_ratio }
    }

    /// True if any operation in this mode may write
    pub fn may_write(&self) -> bool {
        !matches!(self, IoMode::Read)
    }

    /// True if any operation in this mode may read
    pub fn may_read(&self) -> bool {
        !matches!(self, IoMode::Write)
    }
}

/// Where a sequential worker's cursor returns to after reaching `offset_end`
///
/// `Global` sends every worker back to `offset_start`, so after the first lap
/// workers drift into each other's sub-ranges. `Partition` keeps each worker
/// cycling inside its own sub-range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WrapMode {
    Global,
    Partition,
}

impl Default for WrapMode {
    fn default() -> Self {
        Self::Global
    }
}

/// CPU binding for a single worker
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AffinityEntry {
    /// Worker index
    pub worker: usize,
    /// CPU cores the worker may run on
    pub cpus: Vec<usize>,
}

/// Optional mapping from worker index to CPU mask
///
/// Workers without an entry are left to the scheduler.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct AffinityTable {
    entries: Vec<AffinityEntry>,
}

impl AffinityTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `worker` to `cpus`, replacing any earlier entry for that worker
    pub fn insert(&mut self, worker: usize, cpus: Vec<usize>) {
        self.entries.retain(|e| e.worker != worker);
        self.entries.push(AffinityEntry { worker, cpus });
        self.entries.sort_by_key(|e| e.worker);
    }

    /// CPU list for `worker`, if one was configured
    pub fn cpus_for(&self, worker: usize) -> Option<&[usize]> {
        self.entries
            .iter()
            .find(|e| e.worker == worker)
            .map(|e| e.cpus.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[AffinityEntry] {
        &self.entries
    }
}

// Display trait implementations

impl fmt::Display for AccessPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessPattern::Sequential => write!(f, "sequential"),
            AccessPattern::Random => write!(f, "random"),
        }
    }
}

impl fmt::Display for IoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoMode::Read => write!(f, "read"),
            IoMode::Write => write!(f, "write"),
            IoMode::Mixed { write_ratio } => write!(f, "mix(write_ratio={})", write_ratio),
        }
    }
}

impl fmt::Display for WrapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WrapMode::Global => write!(f, "global"),
            WrapMode::Partition => write!(f, "partition"),
        }
    }
}

impl fmt::Display for AffinityTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return write!(f, "none");
        }
        let parts: Vec<String> = self
            .entries
            .iter()
            .map(|e| {
                let cpus: Vec<String> = e.cpus.iter().map(|c| c.to_string()).collect();
                format!("{}:{}", e.worker, cpus.join(","))
            })
            .collect();
        write!(f, "{}", parts.join(" "))
    }
}
