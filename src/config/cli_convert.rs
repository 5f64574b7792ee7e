//! CLI to Config conversion utilities

use crate::config::cli;
use crate::config::workload::WrapMode;
use crate::worker::affinity::parse_cpu_list;
use anyhow::{Context, Result};

/// Parse a size string (e.g., "1G", "100M", "4k") to bytes
pub fn parse_size(s: &str) -> Result<u64> {
    let s = s.trim().to_lowercase();

    let (num_str, multiplier) = if s.ends_with("k") || s.ends_with("kb") {
        (s.trim_end_matches("kb").trim_end_matches("k"), 1024u64)
    } else if s.ends_with("m") || s.ends_with("mb") {
        (s.trim_end_matches("mb").trim_end_matches("m"), 1024 * 1024)
    } else if s.ends_with("g") || s.ends_with("gb") {
        (s.trim_end_matches("gb").trim_end_matches("g"), 1024 * 1024 * 1024)
    } else {
        (s.as_str(), 1)
    };

    let num: u64 = num_str.parse()
        .with_context(|| format!("Invalid size format: {}", s))?;

    num.checked_mul(multiplier)
        .ok_or_else(|| anyhow::anyhow!("Size overflows u64: {}", s))
}

/// Parse an affinity entry of the form `WORKER:CPULIST`
///
/// The CPU list uses the same syntax as taskset: `0,2-4,7`.
///
/// # Example
///
/// ```
/// use iostress::config::cli_convert::parse_affinity;
///
/// let (worker, cpus) = parse_affinity("1:0,2-3").unwrap();
/// assert_eq!(worker, 1);
/// assert_eq!(cpus, vec![0, 2, 3]);
/// ```
pub fn parse_affinity(spec: &str) -> Result<(usize, Vec<usize>)> {
    let (worker_str, cpu_str) = spec
        .split_once(':')
        .ok_or_else(|| anyhow::anyhow!("Affinity must be WORKER:CPULIST, got {}", spec))?;

    let worker: usize = worker_str
        .trim()
        .parse()
        .with_context(|| format!("Invalid worker index in affinity: {}", worker_str))?;

    let cpus = parse_cpu_list(cpu_str)
        .with_context(|| format!("Invalid CPU list in affinity: {}", spec))?;

    Ok((worker, cpus))
}

/// Convert CLI WrapArg to workload WrapMode
pub fn convert_wrap_mode(arg: cli::WrapArg) -> WrapMode {
    match arg {
        cli::WrapArg::Global => WrapMode::Global,
        cli::WrapArg::Partition => WrapMode::Partition,
    }
}
