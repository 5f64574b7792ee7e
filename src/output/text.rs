//! Human-readable text output
//!
//! The configuration summary goes to stderr and the result block to stdout,
//! so `iostress ... > result.txt` captures only the numbers. Each function has
//! a `write_*` form over any [`Write`] for testing.

use crate::config::Config;
use crate::stats::BenchResult;
use crate::util::time::{bytes_to_mib, format_rate, format_secs, format_size};
use std::io::{self, Write};

/// Write the configuration summary
pub fn write_configuration<W: Write>(out: &mut W, config: &Config) -> io::Result<()> {
    let offset_end = config
        .offset_end
        .map(|end| end.to_string())
        .unwrap_or_else(|| "auto".to_string());

    writeln!(out, "== configuration summary ==")?;
    writeln!(out, "multiplicity    {}", config.multiplicity)?;
    writeln!(out, "device_or_file  {}", config.path.display())?;
    writeln!(out, "access_pattern  {}", config.access)?;
    writeln!(out, "access_mode     {}", config.io_mode)?;
    writeln!(out, "direct_io       {}", if config.direct { "yes" } else { "no" })?;
    writeln!(out, "timeout         {}", config.timeout_secs)?;
    writeln!(out, "bogus_comp      {}", config.bogus_comp)?;
    writeln!(out, "block_size      {} ({})", config.block_size, format_size(config.block_size))?;
    writeln!(out, "offset_start    {}", config.offset_start)?;
    writeln!(out, "offset_end      {}", offset_end)?;
    writeln!(out, "misalign        {}", config.misalign)?;
    writeln!(out, "affinity        {}", config.affinity)?;
    writeln!(out, "sequential_wrap {}", config.sequential_wrap)?;
    if let Some(seed) = config.seed {
        writeln!(out, "seed            {}", seed)?;
    }
    Ok(())
}

/// Print the configuration summary to stderr
pub fn print_configuration(config: &Config) {
    let stderr = io::stderr();
    // Nothing sensible to do if stderr is gone
    let _ = write_configuration(&mut stderr.lock(), config);
}

/// Write the result block
///
/// `accum_io_time` is the IO wait averaged over workers.
pub fn write_result<W: Write>(out: &mut W, result: &BenchResult) -> io::Result<()> {
    writeln!(out, "== result ==")?;
    writeln!(out, "iops          {:.6} [blocks/sec]", result.iops)?;
    writeln!(out, "response_time {:.6} [sec]", result.response_time_secs)?;
    writeln!(out, "transfer_rate {:.6} [MiB/sec]", bytes_to_mib(result.bandwidth))?;
    writeln!(out, "accum_io_time {:.6} [sec]", result.iowait_secs)?;
    writeln!(out, "exec_time     {:.6} [sec]", result.exec_time_secs)?;
    writeln!(out, "count         {} [blocks]", result.count)?;
    Ok(())
}

/// Print the result block to stdout
pub fn print_result(result: &BenchResult) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_result(&mut out, result)?;
    out.flush()
}

/// One-line summary for the log
pub fn summary_line(result: &BenchResult) -> String {
    format!(
        "{} IOs by {} workers: {} IOPS, {:.2} MiB/s, mean response {}",
        result.count,
        result.workers,
        format_rate(result.iops),
        bytes_to_mib(result.bandwidth),
        format_secs(result.response_time_secs)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{reduce, Meter};

    fn sample_result() -> BenchResult {
        let meter = Meter {
            iowait_secs: 1.0,
            count: 1000,
            reads: 1000,
            writes: 0,
        };
        reduce(vec![meter; 4], 65536, 2.0).unwrap()
    }

    #[test]
    fn test_write_result_block() {
        let mut out = Vec::new();
        write_result(&mut out, &sample_result()).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("== result ==\n"));
        assert!(text.contains("iops          2000.000000 [blocks/sec]"));
        assert!(text.contains("response_time 0.001000 [sec]"));
        assert!(text.contains("transfer_rate 125.000000 [MiB/sec]"));
        assert!(text.contains("accum_io_time 1.000000 [sec]"));
        assert!(text.contains("count         4000 [blocks]"));
    }

    #[test]
    fn test_write_configuration() {
        let mut config = Config::new("/dev/sdz");
        config.multiplicity = 4;
        config.direct = true;
        config.offset_end = Some(100);

        let mut out = Vec::new();
        write_configuration(&mut out, &config).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("== configuration summary ==\n"));
        assert!(text.contains("multiplicity    4\n"));
        assert!(text.contains("device_or_file  /dev/sdz\n"));
        assert!(text.contains("access_mode     read\n"));
        assert!(text.contains("direct_io       yes\n"));
        assert!(text.contains("block_size      65536 (64KiB)\n"));
        assert!(text.contains("offset_end      100\n"));
        assert!(!text.contains("seed"));
    }

    #[test]
    fn test_summary_line() {
        let line = summary_line(&sample_result());
        assert!(line.starts_with("4000 IOs by 4 workers: 2.00K IOPS, 125.00 MiB/s"));
    }
}
