mod common;

use common::{fixture, fixture_path};
use powermetrics_rs::collector::{CommandRunner, Powermetrics};
use powermetrics_rs::commands::{
    execute_collect_with, execute_decode, validate_args, CollectArgs, DecodeArgs,
};
use powermetrics_rs::output::read_report;
use powermetrics_rs::utils::CollectError;
use std::time::Duration;
use tempfile::tempdir;

struct FixtureRunner(Vec<u8>);

impl CommandRunner for FixtureRunner {
    fn run(&self, _: &str, _: &[String], _: Duration) -> Result<Vec<u8>, CollectError> {
        Ok(self.0.clone())
    }
}

#[test]
fn test_validate_args() {
    assert!(validate_args(&CollectArgs::default()).is_ok());

    let args = CollectArgs {
        samplers: vec!["gpu_power".to_string(), "battery".to_string()],
        sample_interval_ms: 0,
        ..Default::default()
    };
    assert!(validate_args(&args).is_ok());

    let args = CollectArgs {
        samplers: vec!["cpu_power".to_string()],
        ..Default::default()
    };
    assert!(validate_args(&args).is_err());
}

#[test]
fn test_collect_writes_outputs() {
    let dir = tempdir().unwrap();
    let json_path = dir.path().join("reports").join("samples.json");
    let raw_path = dir.path().join("capture.plist");
    let raw = fixture("gpu_power_multiple_samples.xml");

    let args = CollectArgs {
        sample_count: 5,
        sample_interval_ms: 1000,
        output_json: Some(json_path.clone()),
        output_raw: Some(raw_path.clone()),
        ..Default::default()
    };

    let collection =
        execute_collect_with(args, &Powermetrics::with_runner(FixtureRunner(raw.clone()))).unwrap();
    assert_eq!(collection.samples().map(|s| s.len()), Some(5));

    assert_eq!(std::fs::read(&raw_path).unwrap(), raw);

    let report = read_report(&json_path).unwrap();
    assert_eq!(report.sample_count, 5);
    assert_eq!(report.samples.len(), 5);
}

#[test]
fn test_collect_text_format_skips_report() {
    let dir = tempdir().unwrap();
    let json_path = dir.path().join("samples.json");

    let args = CollectArgs {
        format: "text".to_string(),
        output_json: Some(json_path.clone()),
        ..Default::default()
    };

    let runner = FixtureRunner(b"GPU HW active residency: 8.80%\n".to_vec());
    let collection = execute_collect_with(args, &Powermetrics::with_runner(runner)).unwrap();
    assert!(collection.decoded.is_none());
    assert!(!json_path.exists());
}

#[test]
fn test_decode_saved_capture() {
    let dir = tempdir().unwrap();
    let json_path = dir.path().join("decoded.json");

    let args = DecodeArgs {
        input: fixture_path("gpu_power_multiple_samples.xml"),
        output_json: Some(json_path.clone()),
        print_summary: true,
        ..Default::default()
    };

    let decoded = execute_decode(args).unwrap();
    assert_eq!(decoded.samples.len(), 5);
    assert_eq!(read_report(&json_path).unwrap().sample_count, 5);
}

#[test]
fn test_decode_rejects_bad_input() {
    let missing = DecodeArgs {
        input: fixture_path("does_not_exist.xml"),
        ..Default::default()
    };
    assert!(execute_decode(missing).is_err());

    let unknown_sampler = DecodeArgs {
        input: fixture_path("gpu_power.xml"),
        samplers: vec!["thermal".to_string()],
        ..Default::default()
    };
    assert!(execute_decode(unknown_sampler).is_err());

    let no_samplers = DecodeArgs {
        input: fixture_path("gpu_power.xml"),
        samplers: Vec::new(),
        ..Default::default()
    };
    assert!(execute_decode(no_samplers).is_err());
}
