//! Decode command implementation.
//!
//! Decodes a raw powermetrics capture saved earlier (for example with
//! `collect --raw`) without running powermetrics again.

use crate::collector::validate_samplers;
use crate::commands::models::DecodeArgs;
use crate::commands::utils::print_summary;
use crate::output::write_report;
use crate::parser::{decode_samples, DecodedSamples, SampleKind, SampleReport};
use anyhow::{Context, Result};
use log::info;

/// Execute the decode command
///
/// **Public** - main entry point called from main.rs
pub fn execute_decode(args: DecodeArgs) -> Result<DecodedSamples> {
    let kinds: Vec<SampleKind> = validate_samplers(&args.samplers)
        .context("Invalid decode arguments")?
        .into_iter()
        .map(|sampler| sampler.sample_kind())
        .collect();

    if kinds.is_empty() {
        anyhow::bail!("at least one sampler is required");
    }

    info!("Reading capture: {}", args.input.display());
    let raw = std::fs::read(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    let decoded = decode_samples(&raw, &kinds)
        .with_context(|| format!("Failed to decode {}", args.input.display()))?;

    if let Some(json_path) = &args.output_json {
        let report = SampleReport::new(decoded.samples.clone());
        write_report(&report, json_path).context("Failed to write JSON report")?;
        info!("✓ Report written to: {}", json_path.display());
    }

    if args.print_summary {
        print_summary(&decoded);
    }

    Ok(decoded)
}
