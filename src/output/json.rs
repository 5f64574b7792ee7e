//! JSON output formatting
//!
//! Writes the run configuration, the aggregate result and the per-worker
//! meters as one JSON document.

use crate::config::Config;
use crate::stats::{BenchResult, Meter};
use crate::util::time::{bytes_to_mib, format_secs};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Latency in seconds with a human-readable form
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonLatency {
    pub secs: f64,
    pub human: String,
}

impl JsonLatency {
    pub fn from_secs(secs: f64) -> Self {
        Self {
            secs,
            human: format_secs(secs),
        }
    }
}

/// Aggregate figures of the run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResult {
    pub exec_time_secs: f64,
    pub count: u64,
    pub reads: u64,
    pub writes: u64,
    pub iops: f64,
    pub bandwidth_bytes_per_sec: f64,
    pub bandwidth_mib_per_sec: f64,
    pub response_time: JsonLatency,
    /// IO wait averaged over workers
    pub iowait_secs: f64,
    /// IO wait summed over workers
    pub accum_iowait_secs: f64,
}

/// One worker's meter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonWorker {
    pub worker_id: usize,
    #[serde(flatten)]
    pub meter: Meter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<JsonLatency>,
}

/// Complete JSON document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonOutput {
    pub version: String,
    pub config: Config,
    pub result: JsonResult,
    pub workers: Vec<JsonWorker>,
}

/// Build the JSON document for a finished run
pub fn build_output(config: &Config, result: &BenchResult) -> JsonOutput {
    let workers = result
        .meters
        .iter()
        .enumerate()
        .map(|(worker_id, meter)| JsonWorker {
            worker_id,
            meter: *meter,
            response_time: meter.mean_response_secs().map(JsonLatency::from_secs),
        })
        .collect();

    JsonOutput {
        version: env!("CARGO_PKG_VERSION").to_string(),
        config: config.clone(),
        result: JsonResult {
            exec_time_secs: result.exec_time_secs,
            count: result.count,
            reads: result.reads,
            writes: result.writes,
            iops: result.iops,
            bandwidth_bytes_per_sec: result.bandwidth,
            bandwidth_mib_per_sec: bytes_to_mib(result.bandwidth),
            response_time: JsonLatency::from_secs(result.response_time_secs),
            iowait_secs: result.iowait_secs,
            accum_iowait_secs: result.accum_iowait_secs,
        },
        workers,
    }
}

/// Write the JSON document to `output_path`
pub fn write_json_output(output_path: &Path, output: &JsonOutput, pretty: bool) -> Result<()> {
    let file = File::create(output_path)
        .with_context(|| format!("Failed to create {}", output_path.display()))?;
    let writer = BufWriter::new(file);

    if pretty {
        serde_json::to_writer_pretty(writer, output)?;
    } else {
        serde_json::to_writer(writer, output)?;
    }

    Ok(())
}
