use crate::collector::{validate_format, validate_samplers, Config};
use crate::utils::config::{DEFAULT_SAMPLE_COUNT, DEFAULT_SAMPLE_INTERVAL};
use crate::utils::error::ConfigError;
use std::path::PathBuf;
use std::time::Duration;

/// Arguments for the collect command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct CollectArgs {
    /// Number of samples to take
    pub sample_count: u32,

    /// Interval between samples in milliseconds
    pub sample_interval_ms: u64,

    /// Sampler names (e.g. "gpu_power")
    pub samplers: Vec<String>,

    /// Output format name ("plist" or "text")
    pub format: String,

    /// Output path for JSON report (optional)
    pub output_json: Option<PathBuf>,

    /// Output path for the raw capture (optional)
    pub output_raw: Option<PathBuf>,

    /// Print text summary to stdout
    pub print_summary: bool,

    /// Timeout override in seconds
    pub timeout_secs: Option<u64>,
}

impl Default for CollectArgs {
    fn default() -> Self {
        Self {
            sample_count: DEFAULT_SAMPLE_COUNT,
            sample_interval_ms: DEFAULT_SAMPLE_INTERVAL.as_millis() as u64,
            samplers: vec!["gpu_power".to_string()],
            format: "plist".to_string(),
            output_json: None,
            output_raw: None,
            print_summary: false,
            timeout_secs: None,
        }
    }
}

impl CollectArgs {
    /// Build the collector configuration
    pub fn to_config(&self) -> Result<Config, ConfigError> {
        Ok(Config {
            sample_count: self.sample_count,
            sample_interval: Duration::from_millis(self.sample_interval_ms),
            format: validate_format(&self.format)?,
            samplers: validate_samplers(&self.samplers)?,
            timeout: self.timeout_secs.map(Duration::from_secs),
        })
    }
}

/// Arguments for the decode command
#[derive(Debug, Clone)]
pub struct DecodeArgs {
    /// Raw powermetrics capture to decode
    pub input: PathBuf,

    /// Samplers the capture was taken with
    pub samplers: Vec<String>,

    /// Output path for JSON report (optional)
    pub output_json: Option<PathBuf>,

    /// Print text summary to stdout
    pub print_summary: bool,
}

impl Default for DecodeArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::from("capture.plist"),
            samplers: vec!["gpu_power".to_string()],
            output_json: None,
            print_summary: false,
        }
    }
}
