//! powermetrics-rs CLI
//!
//! Runs macOS powermetrics and decodes its plist samples into JSON.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use powermetrics_rs::commands::{
    display_samplers, display_version, execute_collect, execute_decode, validate_args,
    CollectArgs, DecodeArgs,
};

/// powermetrics-rs - typed powermetrics samples
#[derive(Parser, Debug)]
#[command(name = "powermetrics-rs")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run powermetrics and decode its samples (requires root)
    Collect {
        /// Number of samples to take
        #[arg(short = 'n', long, default_value = "1")]
        samples: u32,

        /// Interval between samples in milliseconds (0 keeps the tool default)
        #[arg(short, long, default_value = "5000")]
        interval: u64,

        /// Comma-separated samplers
        #[arg(short, long, value_delimiter = ',', default_value = "gpu_power")]
        samplers: Vec<String>,

        /// powermetrics output format (plist or text)
        #[arg(long, default_value = "plist")]
        format: String,

        /// Output path for JSON report
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Save the raw powermetrics output
        #[arg(long)]
        raw: Option<PathBuf>,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,

        /// Give up after this many seconds
        #[arg(long, env = "POWERMETRICS_TIMEOUT")]
        timeout: Option<u64>,
    },

    /// Decode a saved powermetrics capture
    Decode {
        /// Path to raw powermetrics output
        #[arg(short, long)]
        file: PathBuf,

        /// Comma-separated samplers the capture was taken with
        #[arg(short, long, value_delimiter = ',', default_value = "gpu_power")]
        samplers: Vec<String>,

        /// Output path for JSON report
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// List supported samplers
    Samplers,

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Collect {
            samples,
            interval,
            samplers,
            format,
            output,
            raw,
            summary,
            timeout,
        } => {
            let args = CollectArgs {
                sample_count: samples,
                sample_interval_ms: interval,
                samplers,
                format,
                output_json: output,
                output_raw: raw,
                print_summary: summary,
                timeout_secs: timeout,
            };

            // Validate args first
            validate_args(&args)?;

            execute_collect(args)?;
        }

        Commands::Decode {
            file,
            samplers,
            output,
            summary,
        } => {
            let args = DecodeArgs {
                input: file,
                samplers,
                output_json: output,
                print_summary: summary,
            };

            let decoded = execute_decode(args)?;
            if !summary {
                println!("✓ Decoded {} sample(s)", decoded.samples.len());
            }
        }

        Commands::Samplers => {
            display_samplers();
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
