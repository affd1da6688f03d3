//! Configuration and constants for the collector and CLI.

use std::time::Duration;

/// Name of the system profiler we shell out to
pub const POWERMETRICS_PROGRAM: &str = "powermetrics";

/// Default number of samples per collection run
pub const DEFAULT_SAMPLE_COUNT: u32 = 1;

/// Default sampling interval, same as the powermetrics CLI
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_secs(5);

/// Extra time allowed on top of `sample_count * interval` before giving up
pub const COMMAND_TIMEOUT_SLACK: Duration = Duration::from_secs(10);

/// How often a running powermetrics child is checked for exit
pub const RUNNER_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Upper bound accepted by the CLI for `--samples`
pub const MAX_SAMPLE_COUNT: u32 = 10_000;

/// Literal prologue every plist document starts with
pub const DOCUMENT_MARKER: &[u8] = b"<?xml version";

/// Current JSON export schema version
pub const SCHEMA_VERSION: &str = "1.0.0";
