//! iostress CLI entry point

use anyhow::{Context, Result};
use iostress::config::cli::Cli;
use iostress::config::toml::build_config;
use iostress::config::validator::resolve_config;
use iostress::output::{json, text};
use iostress::run_benchmark;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        for cause in e.chain().skip(1) {
            eprintln!("  Caused by: {}", cause);
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse_args();

    // RUST_LOG wins over -v
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let config = build_config(&cli)?;
    let config = resolve_config(config).context("Configuration validation failed")?;

    if cli.noop {
        text::print_configuration(&config);
        return Ok(());
    }
    if cli.verbose {
        text::print_configuration(&config);
    }

    let result = run_benchmark(&config)?;

    text::print_result(&result).context("Failed to print result")?;
    info!("{}", text::summary_line(&result));

    if let Some(ref path) = cli.json {
        let output = json::build_output(&config, &result);
        json::write_json_output(path, &output, true)?;
        info!("JSON result written to {}", path.display());
    }

    Ok(())
}
