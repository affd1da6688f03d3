mod common;

use common::{fixture, fixture_string};
use powermetrics_rs::output::{read_report, report_to_string, validate_path, write_raw, write_report};
use powermetrics_rs::parser::{decode_samples, SampleKind, SampleReport};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn gpu_report() -> SampleReport {
    let decoded = decode_samples(
        &fixture("gpu_power_multiple_samples.xml"),
        &[SampleKind::GpuPower],
    )
    .unwrap();
    SampleReport::new(decoded.samples)
}

#[test]
fn test_report_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("report.json");
    let report = gpu_report();

    write_report(&report, &path).unwrap();
    let loaded = read_report(&path).unwrap();

    assert_eq!(loaded.version, "1.0.0");
    assert_eq!(loaded.sample_count, 5);
    assert_eq!(loaded.generated_at, report.generated_at);

    for (written, read) in report.samples.iter().zip(loaded.samples.iter()) {
        assert_eq!(written.kind(), read.kind());
        assert_eq!(written.base(), read.base());
    }

    let freqs: Vec<Vec<i64>> = loaded
        .samples
        .gpu_samples()
        .map(|s| s.gpu.dvfm_states.iter().map(|d| d.freq).collect())
        .collect();
    assert_eq!(freqs, vec![vec![338, 618, 1398]; 5]);
}

#[test]
fn test_report_json_shape() {
    let json = report_to_string(&gpu_report()).unwrap();

    assert!(json.contains("\"sample_count\": 5"));
    assert!(json.contains("\"sampler\": \"gpu_power\""));
    assert!(json.contains("\"idle_ratio\": 0.912"));
    assert!(json.contains("\"hw_model\": \"Mac14,6\""));
}

#[test]
fn test_write_report_creates_parent_dirs() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("a").join("b").join("report.json");

    write_report(&gpu_report(), &path).unwrap();
    assert!(path.exists());
}

#[test]
fn test_validate_path() {
    let dir = tempdir().unwrap();

    assert!(validate_path(&dir.path().join("report.json")).is_ok());
    assert!(validate_path(dir.path()).is_err());
    assert!(validate_path(std::path::Path::new("")).is_err());
}

#[test]
fn test_write_raw_is_byte_exact() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("raw").join("capture.plist");
    let raw = fixture("gpu_power_multiple_samples.xml");

    write_raw(&raw, &path).unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), raw);
}

#[test]
fn test_non_finite_ratios_survive_round_trip() {
    let xml = fixture_string("gpu_power.xml")
        .replace(
            "<key>idle_ratio</key><real>0.912000</real>",
            "<key>idle_ratio</key><real>nan</real>",
        )
        .replacen(
            "<key>used_ratio</key><real>0.052800</real>",
            "<key>used_ratio</key><real>-inf</real>",
            1,
        );
    let decoded = decode_samples(xml.as_bytes(), &[SampleKind::GpuPower]).unwrap();
    let report = SampleReport::new(decoded.samples);

    let json = report_to_string(&report).unwrap();
    assert!(json.contains("\"idle_ratio\": \"NaN\""));
    assert!(json.contains("\"used_ratio\": \"-inf\""));

    let dir = tempdir().unwrap();
    let path = dir.path().join("report.json");
    write_report(&report, &path).unwrap();
    let loaded = read_report(&path).unwrap();

    let gpu = &loaded.samples.gpu_samples().next().unwrap().gpu;
    assert!(gpu.idle_ratio.get().is_nan());
    assert!(!gpu.idle_ratio.is_valid());
    assert_eq!(gpu.dvfm_states[0].used_ratio.get(), f64::NEG_INFINITY);
    assert!(gpu.dvfm_states[1].used_ratio.is_valid());
}
