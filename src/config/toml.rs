//! TOML configuration file parsing

use super::*;
use crate::config::cli::Cli;
use crate::config::cli_convert::{convert_wrap_mode, parse_affinity, parse_size};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parse TOML configuration file
pub fn parse_toml_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_toml_string(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse TOML configuration from string
pub fn parse_toml_string(contents: &str) -> Result<Config> {
    let config: Config = ::toml::from_str(contents)
        .context("Failed to parse TOML configuration")?;

    Ok(config)
}

/// Build the run configuration from the command line
///
/// Starts from the configuration file when `--config` is given, otherwise from
/// the defaults, then applies every option that was set on the command line.
pub fn build_config(cli: &Cli) -> Result<Config> {
    let base = match cli.config {
        Some(ref path) => parse_toml_file(path)?,
        None => Config::new(PathBuf::new()),
    };

    merge_cli_with_config(cli, base)
}

/// Merge CLI arguments with TOML configuration (CLI takes precedence)
pub fn merge_cli_with_config(cli: &Cli, mut config: Config) -> Result<Config> {
    if let Some(ref target) = cli.target {
        config.path = target.clone();
    }
    if config.path.as_os_str().is_empty() {
        anyhow::bail!("Device or file is not specified");
    }

    if let Some(multi) = cli.multiplicity {
        config.multiplicity = multi;
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }

    // Access pattern
    if cli.random {
        config.access = AccessPattern::Random;
    } else if cli.sequential {
        config.access = AccessPattern::Sequential;
    }

    // IO direction
    if let Some(ratio) = cli.mix {
        config.io_mode = IoMode::mixed(ratio);
    } else if cli.write {
        config.io_mode = IoMode::Write;
    }

    if cli.direct {
        config.direct = true;
    }

    if let Some(ref bs) = cli.block_size {
        config.block_size = parse_size(bs).context("Invalid block size")?;
    }
    if let Some(start) = cli.offset_start {
        config.offset_start = start;
    }
    if let Some(end) = cli.offset_end {
        config.offset_end = Some(end);
    }
    if let Some(misalign) = cli.misalign {
        config.misalign = misalign;
    }
    if let Some(bogus) = cli.bogus_comp {
        config.bogus_comp = bogus;
    }
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if let Some(wrap) = cli.wrap {
        config.sequential_wrap = convert_wrap_mode(wrap);
    }

    // Affinity entries extend (and override per worker) the file's table
    for spec in &cli.affinity {
        let (worker, cpus) = parse_affinity(spec)?;
        config.affinity.insert(worker, cpus);
    }

    Ok(config)
}
