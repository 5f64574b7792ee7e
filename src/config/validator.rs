//! Configuration validation
//!
//! Everything that can be rejected is rejected here, before any worker is
//! spawned. [`resolve_config`] also fills in `offset_end` from the target size,
//! producing the finished configuration the benchmark core consumes.

use super::*;
use crate::target::{open_target, target_size, OpenFlags};
use anyhow::{Context, Result};

/// Validate fields that do not depend on the target
pub fn validate_config(config: &Config) -> Result<()> {
    if config.path.as_os_str().is_empty() {
        anyhow::bail!("Device or file is not specified");
    }

    if config.multiplicity == 0 {
        anyhow::bail!("multiplicity must be at least 1");
    }

    if config.block_size == 0 {
        anyhow::bail!("block_size must be greater than 0");
    }

    if config.timeout_secs == 0 {
        anyhow::bail!("timeout must be at least 1 second");
    }

    validate_workload(config)?;
    validate_affinity(&config.affinity, config.multiplicity)?;

    if config.direct {
        validate_direct_io(config)?;
    }

    Ok(())
}

/// Validate access pattern / IO mode combinations
fn validate_workload(config: &Config) -> Result<()> {
    if let IoMode::Mixed { write_ratio } = config.io_mode {
        if config.access == AccessPattern::Sequential {
            anyhow::bail!("Only read or write can be specified with sequential access");
        }
        if !(0.0..=1.0).contains(&write_ratio) {
            anyhow::bail!("write ratio must be between 0.0 and 1.0, got {}", write_ratio);
        }
    }

    Ok(())
}

/// Validate affinity table against the worker count
fn validate_affinity(table: &AffinityTable, multiplicity: usize) -> Result<()> {
    for entry in table.entries() {
        if entry.worker >= multiplicity {
            anyhow::bail!(
                "affinity given for worker {} but multiplicity is {}",
                entry.worker,
                multiplicity
            );
        }
        if entry.cpus.is_empty() {
            anyhow::bail!("affinity for worker {} has an empty CPU list", entry.worker);
        }
    }

    Ok(())
}

/// Validate direct IO requirements
fn validate_direct_io(config: &Config) -> Result<()> {
    if config.block_size % DIRECT_IO_ALIGNMENT != 0 {
        anyhow::bail!(
            "--direct specified. Block size must be a multiple of {} bytes, got {}",
            DIRECT_IO_ALIGNMENT,
            config.block_size
        );
    }

    // SAFETY: geteuid has no preconditions and cannot fail
    if unsafe { libc::geteuid() } != 0 {
        anyhow::bail!("You must be root to use --direct");
    }

    Ok(())
}

/// Validate `config` against its target and resolve `offset_end`
///
/// Opens the target once in the mode the workers will use (permission check),
/// queries its size, and checks the block window fits inside it.
pub fn resolve_config(mut config: Config) -> Result<Config> {
    validate_config(&config)?;

    let flags = OpenFlags::for_mode(config.io_mode, config.direct);
    drop(open_target(&config.path, flags)
        .with_context(|| format!("Cannot open {} for {}", config.path.display(), config.io_mode))?);

    let size = target_size(&config.path)
        .with_context(|| format!("Cannot determine size of {}", config.path.display()))?;

    resolve_window(&mut config, size)?;

    if let Some(end_address) = config.window_end_address() {
        if end_address > size {
            tracing::warn!(
                "misalign {} pushes the last block past the end of {} ({} > {} bytes); \
                 the run will abort with a short transfer when it reaches that block",
                config.misalign,
                config.path.display(),
                end_address,
                size
            );
        }
    }

    Ok(config)
}

/// Check the block window against a target of `size` bytes and fill in the default end
///
/// An explicit `offset_end` must leave room for `misalign`; the default end
/// is only checked for address overflow.
pub fn resolve_window(config: &mut Config, size: u64) -> Result<()> {
    let max_blocks = size / config.block_size;
    let explicit_end = matches!(config.offset_end, Some(end) if end != 0);

    if config.offset_start.saturating_mul(config.block_size) > size {
        anyhow::bail!("Too big offset-start. Maximum: {}", max_blocks);
    }

    let end = match config.offset_end {
        Some(end) if end.saturating_mul(config.block_size) > size => {
            anyhow::bail!("Too big offset-end. Maximum: {}", max_blocks);
        }
        Some(0) | None => max_blocks,
        Some(end) => end,
    };

    if config.offset_start >= end {
        anyhow::bail!(
            "offset-start ({}) must be less than offset-end ({})",
            config.offset_start,
            end
        );
    }

    config.offset_end = Some(end);

    let end_address = config.window_end_address().with_context(|| {
        format!("Too big misalign: {} overflows the address of block {}", config.misalign, end)
    })?;
    if explicit_end && end_address > size {
        anyhow::bail!(
            "Too big misalign: block {} plus {} bytes ends at {}, past the {} byte target",
            end,
            config.misalign,
            end_address,
            size
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn test_config() -> Config {
        let mut config = Config::new("/tmp/target.dat");
        config.block_size = 4096;
        config
    }

    #[test]
    fn test_validate_defaults_ok() {
        assert!(validate_config(&test_config()).is_ok());
    }

    #[test]
    fn test_validate_zero_multiplicity() {
        let mut config = test_config();
        config.multiplicity = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_block_size() {
        let mut config = test_config();
        config.block_size = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = test_config();
        config.timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_mixed_sequential_rejected() {
        let mut config = test_config();
        config.io_mode = IoMode::mixed(0.5);
        config.access = AccessPattern::Sequential;
        assert!(validate_config(&config).is_err());

        config.access = AccessPattern::Random;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_affinity_out_of_range() {
        let mut config = test_config();
        config.multiplicity = 2;
        config.affinity.insert(2, vec![0]);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_affinity_empty_cpus() {
        let mut config = test_config();
        config.affinity.insert(0, vec![]);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_direct_alignment() {
        let mut config = test_config();
        config.direct = true;
        config.block_size = 1000;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("multiple of 512"));
    }

    #[test]
    fn test_resolve_window_default_end() {
        let mut config = test_config();
        resolve_window(&mut config, 4096 * 100 + 17).unwrap();
        assert_eq!(config.offset_end, Some(100));
    }

    #[test]
    fn test_resolve_window_explicit_end() {
        let mut config = test_config();
        config.offset_start = 10;
        config.offset_end = Some(50);
        resolve_window(&mut config, 4096 * 100).unwrap();
        assert_eq!(config.offset_end, Some(50));
    }

    #[test]
    fn test_resolve_window_end_too_big() {
        let mut config = test_config();
        config.offset_end = Some(101);
        let err = resolve_window(&mut config, 4096 * 100).unwrap_err();
        assert!(err.to_string().contains("Maximum: 100"));
    }

    #[test]
    fn test_resolve_window_start_too_big() {
        let mut config = test_config();
        config.offset_start = 200;
        assert!(resolve_window(&mut config, 4096 * 100).is_err());
    }

    #[test]
    fn test_resolve_window_empty() {
        let mut config = test_config();
        config.offset_start = 100;
        assert!(resolve_window(&mut config, 4096 * 100).is_err());

        // Target smaller than one block
        let mut config = test_config();
        assert!(resolve_window(&mut config, 100).is_err());
    }

    #[test]
    fn test_resolve_window_misalign_overflow() {
        let mut config = test_config();
        config.offset_end = Some(4);
        config.misalign = u64::MAX - 100;
        let err = resolve_window(&mut config, 4096 * 4).unwrap_err();
        assert!(err.to_string().contains("Too big misalign"));

        // Default end overflows too
        let mut config = test_config();
        config.misalign = u64::MAX - 100;
        assert!(resolve_window(&mut config, 4096 * 4).is_err());
    }

    #[test]
    fn test_resolve_window_explicit_end_misalign_overrun() {
        let mut config = test_config();
        config.offset_end = Some(4);
        config.misalign = 100;
        let err = resolve_window(&mut config, 4096 * 4).unwrap_err();
        assert!(err.to_string().contains("Too big misalign"));

        // One block of slack leaves room for the misalign
        let mut config = test_config();
        config.offset_end = Some(3);
        config.misalign = 100;
        resolve_window(&mut config, 4096 * 4).unwrap();
        assert_eq!(config.offset_end, Some(3));
    }

    #[test]
    fn test_resolve_window_default_end_misalign_overrun_allowed() {
        let mut config = test_config();
        config.misalign = 100;
        resolve_window(&mut config, 4096 * 4).unwrap();
        assert_eq!(config.offset_end, Some(4));
    }

    #[test]
    fn test_resolve_config_misalign_overflow() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&vec![0u8; 4096 * 4]).unwrap();
        file.flush().unwrap();

        let mut config = test_config();
        config.path = file.path().to_path_buf();
        config.misalign = u64::MAX - 100;
        assert!(resolve_config(config).is_err());
    }

    #[test]
    fn test_resolve_config_with_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&vec![0u8; 4096 * 16]).unwrap();
        file.flush().unwrap();

        let mut config = test_config();
        config.path = file.path().to_path_buf();

        let resolved = resolve_config(config).unwrap();
        assert_eq!(resolved.offset_end, Some(16));
    }

    #[test]
    fn test_resolve_config_missing_target() {
        let config = test_config();
        let mut config = config;
        config.path = PathBuf::from("/nonexistent/iostress.dat");
        assert!(resolve_config(config).is_err());
    }
}
