use crate::collector::supported_samplers;
use crate::parser::{DecodedSamples, Ratio, Sample};
use crate::utils::config::SCHEMA_VERSION;

/// Render a ratio as a percentage, or `n/a` when it is not a valid ratio
pub fn format_ratio(ratio: Ratio) -> String {
    match ratio.valid() {
        Some(value) => format!("{:.2}%", value * 100.0),
        None => "n/a".to_string(),
    }
}

/// Print a text summary of decoded samples
pub fn print_summary(decoded: &DecodedSamples) {
    println!("\n{}", "=".repeat(80));
    println!("SAMPLE SUMMARY");
    println!("{}", "=".repeat(80));
    println!("Samples:  {}", decoded.samples.len());
    println!("Skipped:  {}", decoded.skipped);

    if let Some(primary) = decoded.primary() {
        let base = primary.base();
        println!("Hardware: {}", base.hw_model);
        println!("Kernel:   {}", base.kern_osversion);
    }
    println!();

    for (i, sample) in decoded.samples.iter().enumerate() {
        let timestamp = sample.timestamp().to_rfc3339();
        match sample {
            Sample::GpuPower(sample) => {
                let gpu = &sample.gpu;
                let energy = gpu
                    .energy_mw
                    .map(|mw| format!("{} mW", mw))
                    .unwrap_or_else(|| "n/a".to_string());
                println!(
                    "{:>3}. {} gpu freq {:.2} idle {} energy {}",
                    i,
                    timestamp,
                    gpu.freq_hz,
                    format_ratio(gpu.idle_ratio),
                    energy
                );
            }
            Sample::Battery(sample) => {
                println!(
                    "{:>3}. {} battery {}%",
                    i, timestamp, sample.battery.percent_charge
                );
            }
        }
    }

    println!("{}", "=".repeat(80));
}

/// Display supported samplers
pub fn display_samplers() {
    println!("Supported samplers:");
    for name in supported_samplers() {
        println!("  {}", name);
    }
}

/// Display version information
pub fn display_version() {
    println!("powermetrics-rs v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Collect and decode macOS powermetrics samples.");
}
