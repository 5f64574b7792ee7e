//! CLI argument parsing using clap

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Wraparound behaviour for sequential workers
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WrapArg {
    /// Every worker returns to offset-start (reference behaviour)
    Global,
    /// Each worker cycles inside its own sub-range
    Partition,
}

/// iostress - multi-threaded raw storage microbenchmark
///
/// Value options left unset fall back to the configuration file (if any) and
/// then to the built-in defaults.
#[derive(Parser, Debug)]
#[command(name = "iostress")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Block device or file to benchmark
    #[arg(value_name = "PATH")]
    pub target: Option<PathBuf>,

    /// TOML configuration file (command-line options take precedence)
    #[arg(long, env = "IOSTRESS_CONFIG")]
    pub config: Option<PathBuf>,

    // === Workers ===
    /// Number of worker threads [default: 1]
    #[arg(short = 'm', long)]
    pub multiplicity: Option<usize>,

    /// Bind a worker to CPUs, as WORKER:CPULIST (e.g. 0:0-3). Repeatable
    #[arg(short = 'a', long = "affinity", value_name = "WORKER:CPULIST")]
    pub affinity: Vec<String>,

    /// Seconds each worker runs [default: 60]
    #[arg(short = 't', long)]
    pub timeout: Option<u64>,

    // === Workload ===
    /// Random access
    #[arg(short = 'R', long, conflicts_with = "sequential")]
    pub random: bool,

    /// Sequential access (default)
    #[arg(short = 'S', long)]
    pub sequential: bool,

    /// Write instead of read
    #[arg(short = 'W', long, conflicts_with = "mix")]
    pub write: bool,

    /// Read/write mixture: probability of a write (0.0 = all reads, 1.0 = all writes)
    #[arg(short = 'M', long, value_name = "RATIO")]
    pub mix: Option<f64>,

    /// Use direct IO (O_DIRECT)
    #[arg(short = 'd', long)]
    pub direct: bool,

    /// Bytes per IO (e.g. 4k, 64k, 1m) [default: 64k]
    #[arg(short = 'b', long)]
    pub block_size: Option<String>,

    /// First block of the addressable window
    #[arg(short = 's', long)]
    pub offset_start: Option<u64>,

    /// End block of the addressable window (exclusive) [default: target size / block size]
    #[arg(short = 'e', long)]
    pub offset_end: Option<u64>,

    /// Bytes added to every IO address
    #[arg(short = 'z', long)]
    pub misalign: Option<u64>,

    /// Dummy computation iterations between IOs
    #[arg(short = 'c', long)]
    pub bogus_comp: Option<u64>,

    /// Common seed for random offsets (reproducible runs)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Sequential wraparound behaviour [default: global]
    #[arg(long, value_enum)]
    pub wrap: Option<WrapArg>,

    // === Output ===
    /// Write the result as JSON to this file
    #[arg(long, value_name = "PATH")]
    pub json: Option<PathBuf>,

    /// Print the configuration and exit without running
    #[arg(short = 'N', long)]
    pub noop: bool,

    /// Print the configuration before running and enable debug logging
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reference_style_flags() {
        let cli = Cli::try_parse_from([
            "iostress", "-m", "4", "-R", "-M", "0.3", "-b", "4k", "-t", "5", "-a", "0:0-1",
            "-a", "1:2", "/dev/null",
        ])
        .unwrap();

        assert_eq!(cli.multiplicity, Some(4));
        assert!(cli.random);
        assert_eq!(cli.mix, Some(0.3));
        assert_eq!(cli.block_size.as_deref(), Some("4k"));
        assert_eq!(cli.timeout, Some(5));
        assert_eq!(cli.affinity, vec!["0:0-1".to_string(), "1:2".to_string()]);
        assert_eq!(cli.target, Some(PathBuf::from("/dev/null")));
    }

    #[test]
    fn test_write_conflicts_with_mix() {
        let result = Cli::try_parse_from(["iostress", "-W", "-M", "0.5", "/dev/null"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_random_conflicts_with_sequential() {
        let result = Cli::try_parse_from(["iostress", "-R", "-S", "/dev/null"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_wrap_value() {
        let cli = Cli::try_parse_from(["iostress", "--wrap", "partition", "/dev/null"]).unwrap();
        assert_eq!(cli.wrap, Some(WrapArg::Partition));
    }
}
