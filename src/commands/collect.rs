//! Collect command implementation.
//!
//! The collect command:
//! 1. Runs powermetrics with the requested samplers
//! 2. Decodes the plist output into typed samples
//! 3. Writes output files

use crate::collector::{Collection, CommandRunner, Format, Powermetrics};
use crate::commands::models::CollectArgs;
use crate::commands::utils::print_summary;
use crate::output::{write_raw, write_report};
use crate::parser::SampleReport;
use crate::utils::config::MAX_SAMPLE_COUNT;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::io::Write;
use std::time::Instant;

/// Execute the collect command against the real powermetrics binary
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Invalid configuration
/// * powermetrics failing to run (it needs root)
/// * No decodable sample in the output
/// * File write errors
pub fn execute_collect(args: CollectArgs) -> Result<Collection> {
    execute_collect_with(args, &Powermetrics::new())
}

/// Execute the collect command with a specific collector
///
/// **Public** - lets callers and tests supply their own runner
pub fn execute_collect_with<R: CommandRunner>(
    args: CollectArgs,
    collector: &Powermetrics<R>,
) -> Result<Collection> {
    let start_time = Instant::now();
    let config = args.to_config().context("Invalid collect arguments")?;

    // Step 1: Run powermetrics
    info!("Step 1/3: Running powermetrics...");
    let collection = collector
        .collect(&config)
        .context("Failed to collect powermetrics samples")?;

    // Step 2: Report what was decoded
    info!("Step 2/3: Inspecting decoded samples...");
    match &collection.decoded {
        Some(decoded) => {
            debug!(
                "Decode path {:?}, {} sample(s), {} document(s) skipped",
                decoded.path,
                decoded.samples.len(),
                decoded.skipped
            );
            if decoded.skipped > 0 {
                warn!("{} document(s) could not be decoded", decoded.skipped);
            }
        }
        None => debug!("Text format: nothing to decode"),
    }

    // Step 3: Write outputs
    info!("Step 3/3: Writing output files...");
    if let Some(raw_path) = &args.output_raw {
        write_raw(&collection.raw_output, raw_path).context("Failed to write raw capture")?;
        info!("✓ Raw capture written to: {}", raw_path.display());
    }

    if let Some(json_path) = &args.output_json {
        match collection.samples() {
            Some(samples) => {
                let report = SampleReport::new(samples.clone());
                write_report(&report, json_path).context("Failed to write JSON report")?;
                info!("✓ Report written to: {}", json_path.display());
            }
            None => warn!("JSON report needs plist format, skipping {}", json_path.display()),
        }
    }

    if config.format == Format::Text {
        std::io::stdout()
            .write_all(&collection.raw_output)
            .context("Failed to print powermetrics output")?;
    }

    if args.print_summary {
        if let Some(decoded) = &collection.decoded {
            print_summary(decoded);
        }
    }

    info!(
        "Collect completed in {:.2}s",
        start_time.elapsed().as_secs_f64()
    );

    Ok(collection)
}

/// Validate collect arguments
///
/// **Public** - can be called before execute_collect for early validation
pub fn validate_args(args: &CollectArgs) -> Result<()> {
    if args.sample_count == 0 {
        anyhow::bail!("sample count must be greater than 0");
    }

    if args.sample_count > MAX_SAMPLE_COUNT {
        anyhow::bail!("sample count is too large (max {})", MAX_SAMPLE_COUNT);
    }

    if args.samplers.is_empty() {
        anyhow::bail!("at least one sampler is required");
    }

    args.to_config().context("Invalid collect arguments")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_args_valid() {
        assert!(validate_args(&CollectArgs::default()).is_ok());
    }

    #[test]
    fn test_validate_args_zero_samples() {
        let args = CollectArgs {
            sample_count: 0,
            ..Default::default()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_too_many_samples() {
        let args = CollectArgs {
            sample_count: MAX_SAMPLE_COUNT + 1,
            ..Default::default()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_unknown_sampler() {
        let args = CollectArgs {
            samplers: vec!["gpu_power".to_string(), "thermal".to_string()],
            ..Default::default()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_unknown_format() {
        let args = CollectArgs {
            format: "csv".to_string(),
            ..Default::default()
        };
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_validate_args_no_samplers() {
        let args = CollectArgs {
            samplers: Vec::new(),
            ..Default::default()
        };
        assert!(validate_args(&args).is_err());
    }
}
