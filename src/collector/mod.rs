//! powermetrics invocation and collection.
//!
//! The collector validates a [`Config`], runs powermetrics through a
//! [`CommandRunner`] and, for plist output, hands the bytes to the sample
//! orchestrator.

pub mod config;
pub mod runner;

pub use config::{supported_samplers, validate_format, validate_samplers, Config, Format, Sampler};
pub use runner::{CommandRunner, SystemRunner};

use crate::parser::{decode_samples, DecodedSamples, ResultCollection, Sample};
use crate::utils::config::POWERMETRICS_PROGRAM;
use crate::utils::error::CollectError;
use log::info;

/// Output of one powermetrics run
#[derive(Debug, Clone)]
pub struct Collection {
    /// Untouched stdout of the command
    pub raw_output: Vec<u8>,

    /// Decoded samples; `None` for text format
    pub decoded: Option<DecodedSamples>,
}

impl Collection {
    pub fn samples(&self) -> Option<&ResultCollection> {
        self.decoded.as_ref().map(|decoded| &decoded.samples)
    }

    /// First sample in document order
    pub fn primary(&self) -> Option<&Sample> {
        self.decoded.as_ref().and_then(DecodedSamples::primary)
    }
}

/// powermetrics collector
pub struct Powermetrics<R = SystemRunner> {
    runner: R,
}

impl Powermetrics<SystemRunner> {
    /// Collector that runs the real powermetrics binary
    pub fn new() -> Self {
        Self::with_runner(SystemRunner)
    }
}

impl Default for Powermetrics<SystemRunner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: CommandRunner> Powermetrics<R> {
    pub fn with_runner(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run powermetrics once with the given configuration
    ///
    /// **Public** - main entry point for collection
    ///
    /// # Errors
    /// * `CollectError::Config` - rejected before anything runs
    /// * `CollectError::Spawn` / `CommandFailed` / `Timeout` - process failures
    /// * `CollectError::NoValidDocuments` - plist output held no decodable sample
    pub fn collect(&self, config: &Config) -> Result<Collection, CollectError> {
        config.validate()?;

        let args = config.to_args();
        let timeout = config.command_timeout();
        info!(
            "Collecting {} sample(s) from {} ({})",
            config.sample_count,
            POWERMETRICS_PROGRAM,
            args.join(" ")
        );

        let raw_output = self.runner.run(POWERMETRICS_PROGRAM, &args, timeout)?;

        let decoded = match config.format {
            Format::Plist => Some(decode_samples(&raw_output, &config.sample_kinds())?),
            Format::Text => None,
        };

        Ok(Collection { raw_output, decoded })
    }
}
