//! CPU affinity binding
//!
//! A worker that has an entry in the [`AffinityTable`] pins its own thread to
//! that CPU list before entering the timed loop. Workers without an entry are
//! left to the scheduler. Binding failure is logged and the worker proceeds
//! unbound.
//!
//! # Example
//!
//! ```no_run
//! use iostress::worker::affinity::{set_cpu_affinity, parse_cpu_list};
//!
//! // Bind to CPU cores 0, 2, 3, 4
//! let cores = parse_cpu_list("0,2-4").unwrap();
//! set_cpu_affinity(&cores).unwrap();
//! ```

use crate::config::workload::AffinityTable;
use crate::error::BenchError;
use anyhow::Context;
use tracing::{debug, warn};

/// Set CPU affinity for the current thread
///
/// # Errors
///
/// Returns [`BenchError::Affinity`] if the list is empty, names a core outside
/// the kernel's cpu_set_t, or `sched_setaffinity` rejects it (for example
/// because none of the cores are online).
#[cfg(target_os = "linux")]
pub fn set_cpu_affinity(cores: &[usize]) -> Result<(), BenchError> {
    use libc::{cpu_set_t, sched_setaffinity, CPU_SET, CPU_SETSIZE, CPU_ZERO};
    use std::mem;

    let invalid = || BenchError::Affinity {
        cores: cores.to_vec(),
        source: std::io::Error::from_raw_os_error(libc::EINVAL),
    };

    if cores.is_empty() || cores.iter().any(|&core| core >= CPU_SETSIZE as usize) {
        return Err(invalid());
    }

    // SAFETY: cpu_set_t is plain data; every core index was bounds checked
    // above and the set outlives the syscall.
    let result = unsafe {
        let mut cpu_set: cpu_set_t = mem::zeroed();
        CPU_ZERO(&mut cpu_set);
        for &core in cores {
            CPU_SET(core, &mut cpu_set);
        }

        // pid 0 = calling thread
        sched_setaffinity(0, mem::size_of::<cpu_set_t>(), &cpu_set)
    };

    if result != 0 {
        return Err(BenchError::Affinity {
            cores: cores.to_vec(),
            source: std::io::Error::last_os_error(),
        });
    }

    Ok(())
}

#[cfg(not(target_os = "linux"))]
pub fn set_cpu_affinity(cores: &[usize]) -> Result<(), BenchError> {
    Err(BenchError::Affinity {
        cores: cores.to_vec(),
        source: std::io::Error::from(std::io::ErrorKind::Unsupported),
    })
}

/// Apply the table entry for `worker` to the calling thread, if there is one
///
/// Returns true if the thread ended up bound.
pub fn bind_worker(table: &AffinityTable, worker: usize) -> bool {
    let Some(cores) = table.cpus_for(worker) else {
        return false;
    };

    match set_cpu_affinity(cores) {
        Ok(()) => {
            debug!("Worker {} bound to CPUs {:?}", worker, cores);
            true
        }
        Err(e) => {
            warn!("Worker {}: {}; running unbound", worker, e);
            false
        }
    }
}

/// Parse a comma-separated list of CPU cores or ranges
///
/// Supports formats like:
/// - "0,1,2,3" - Individual cores
/// - "0-3" - Range of cores
/// - "0,2-4,7" - Mixed individual and ranges
///
/// The result is sorted and free of duplicates.
///
/// # Example
///
/// ```
/// use iostress::worker::affinity::parse_cpu_list;
///
/// let cores = parse_cpu_list("7,0,2-4").unwrap();
/// assert_eq!(cores, vec![0, 2, 3, 4, 7]);
/// ```
pub fn parse_cpu_list(spec: &str) -> anyhow::Result<Vec<usize>> {
    let parse_core = |s: &str| -> anyhow::Result<usize> {
        s.trim()
            .parse()
            .with_context(|| format!("Invalid CPU core number: {}", s))
    };

    let mut cores = Vec::new();

    for part in spec.split(',').map(str::trim) {
        match part.split_once('-') {
            Some((lo, hi)) => {
                if hi.contains('-') {
                    anyhow::bail!("Invalid CPU range format: {}", part);
                }
                let (start, end) = (parse_core(lo)?, parse_core(hi)?);
                if start > end {
                    anyhow::bail!("Invalid CPU range: start ({}) > end ({})", start, end);
                }
                cores.extend(start..=end);
            }
            None => cores.push(parse_core(part)?),
        }
    }

    cores.sort_unstable();
    cores.dedup();

    Ok(cores)
}

/// Log a warning if there are more worker threads than usable CPUs
///
/// Returns true if the run is oversubscribed.
pub fn warn_if_oversubscribed(thread_count: usize) -> bool {
    let cpu_count = num_cpus::get();
    if thread_count > cpu_count {
        warn!(
            "Thread count ({}) exceeds CPU count ({}); context switches will show up in response times",
            thread_count, cpu_count
        );
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cpu_list_single() {
        assert_eq!(parse_cpu_list("0").unwrap(), vec![0]);
    }

    #[test]
    fn test_parse_cpu_list_range() {
        assert_eq!(parse_cpu_list("0-3").unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_parse_cpu_list_mixed_with_spaces() {
        assert_eq!(parse_cpu_list("0, 2-4, 7").unwrap(), vec![0, 2, 3, 4, 7]);
    }

    #[test]
    fn test_parse_cpu_list_dedup_and_sort() {
        assert_eq!(parse_cpu_list("3,1,1,2-3,0").unwrap(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_parse_cpu_list_invalid() {
        assert!(parse_cpu_list("").is_err());
        assert!(parse_cpu_list("0,abc,2").is_err());
        assert!(parse_cpu_list("5-2").is_err());
        assert!(parse_cpu_list("0-2-4").is_err());
    }

    #[test]
    fn test_warn_if_oversubscribed() {
        let cpu_count = num_cpus::get();
        assert!(!warn_if_oversubscribed(cpu_count));
        assert!(warn_if_oversubscribed(cpu_count + 1));
    }

    #[test]
    fn test_set_cpu_affinity_empty() {
        assert!(matches!(set_cpu_affinity(&[]), Err(BenchError::Affinity { .. })));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_set_cpu_affinity_out_of_range() {
        let result = set_cpu_affinity(&[1 << 20]);
        assert!(matches!(result, Err(BenchError::Affinity { .. })));
    }

    #[test]
    fn test_bind_worker_without_entry() {
        let table = AffinityTable::new();
        assert!(!bind_worker(&table, 0));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_bind_worker_current_cpu() {
        // Run on a scratch thread so the test harness thread keeps its mask
        std::thread::spawn(|| {
            // SAFETY: sched_getcpu has no preconditions
            let cpu = unsafe { libc::sched_getcpu() };
            assert!(cpu >= 0);

            let mut table = AffinityTable::new();
            table.insert(3, vec![cpu as usize]);
            assert!(bind_worker(&table, 3));
        })
        .join()
        .unwrap();
    }
}
