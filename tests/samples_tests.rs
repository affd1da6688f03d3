mod common;

use chrono::{TimeZone, Utc};
use common::{fixture, fixture_string};
use powermetrics_rs::parser::{decode_samples, split_documents, DecodePath, SampleKind};
use powermetrics_rs::utils::DecodeError;
use pretty_assertions::assert_eq;

const GPU: &[SampleKind] = &[SampleKind::GpuPower];

#[test]
fn test_multiple_samples() {
    let decoded = decode_samples(&fixture("gpu_power_multiple_samples.xml"), GPU).unwrap();

    assert_eq!(decoded.samples.len(), 5);
    assert_eq!(decoded.path, DecodePath::MultiDocument);
    assert_eq!(decoded.skipped, 0);

    for sample in decoded.samples.gpu_samples() {
        assert!(!sample.base.hw_model.is_empty());
        assert!(sample.gpu.freq_hz > 0.0);
        assert!(sample.gpu.idle_ratio.is_valid());
        assert!(!sample.gpu.dvfm_states.is_empty());
        assert!(!sample.gpu.sw_requested_states.is_empty());
        assert!(!sample.gpu.sw_states.is_empty());
    }

    let first = decoded.samples.primary().unwrap();
    let last = decoded.samples.latest().unwrap();
    assert_ne!(first.timestamp(), last.timestamp());
    assert_eq!(decoded.primary(), Some(&decoded.samples.as_slice()[0]));
}

#[test]
fn test_single_sample() {
    let decoded = decode_samples(&fixture("gpu_power.xml"), GPU).unwrap();

    assert_eq!(decoded.samples.len(), 1);
    // The prologue is present, so the stream pass finds it
    assert_eq!(decoded.path, DecodePath::MultiDocument);

    let gpu = decoded.primary().and_then(|s| s.as_gpu()).unwrap();
    assert!(gpu.gpu.freq_hz > 0.0);
}

#[test]
fn test_truncated_document_is_skipped() {
    let bytes = fixture("gpu_power_multiple_samples.xml");
    let candidates: Vec<&[u8]> = split_documents(&bytes).take(3).collect();

    let mut stream = candidates[0].to_vec();
    stream.extend_from_slice(&candidates[1][..candidates[1].len() / 2]);
    stream.extend_from_slice(candidates[2]);

    let decoded = decode_samples(&stream, GPU).unwrap();
    assert_eq!(decoded.samples.len(), 2);
    assert_eq!(decoded.skipped, 1);

    let timestamps: Vec<_> = decoded.samples.iter().map(|s| s.timestamp()).collect();
    assert_eq!(
        timestamps,
        vec![
            Utc.with_ymd_and_hms(2024, 4, 10, 12, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 4, 10, 12, 0, 2).unwrap(),
        ]
    );
}

#[test]
fn test_empty_input_fails() {
    let err = decode_samples(b"", GPU).unwrap_err();
    assert_eq!(err.candidates, 0);
    assert!(matches!(err.fallback, DecodeError::MissingRoot));
}

#[test]
fn test_no_decodable_document_fails() {
    let bytes = b"<?xml version=\"1.0\"?><plist version=\"1.0\"><dict></dict></plist>";
    let err = decode_samples(bytes, GPU).unwrap_err();
    assert_eq!(err.candidates, 1);
    assert!(matches!(err.fallback, DecodeError::MissingField(_)));
}

#[test]
fn test_document_without_prologue_uses_fallback() {
    let xml = fixture_string("gpu_power.xml");
    let start = xml.find("<plist").unwrap();

    let decoded = decode_samples(xml[start..].as_bytes(), GPU).unwrap();
    assert_eq!(decoded.path, DecodePath::SingleDocument);
    assert_eq!(decoded.samples.len(), 1);
    assert_eq!(decoded.skipped, 0);
}

#[test]
fn test_multiple_kinds_per_document() {
    let kinds = [SampleKind::GpuPower, SampleKind::Battery];
    let decoded = decode_samples(&fixture("gpu_battery.xml"), &kinds).unwrap();

    let order: Vec<SampleKind> = decoded.samples.iter().map(|s| s.kind()).collect();
    assert_eq!(
        order,
        vec![
            SampleKind::GpuPower,
            SampleKind::Battery,
            SampleKind::GpuPower,
            SampleKind::Battery,
        ]
    );

    let charges: Vec<i64> = decoded
        .samples
        .battery_samples()
        .map(|s| s.battery.percent_charge)
        .collect();
    assert_eq!(charges, vec![87, 86]);
    assert!(decoded.samples.gpu_samples().all(|s| s.gpu.energy_mw.is_none()));
}

#[test]
fn test_missing_kind_does_not_reject_document() {
    let kinds = [SampleKind::Battery, SampleKind::GpuPower];
    let decoded = decode_samples(&fixture("gpu_power_multiple_samples.xml"), &kinds).unwrap();

    assert_eq!(decoded.samples.len(), 5);
    assert_eq!(decoded.skipped, 0);
    assert_eq!(decoded.samples.battery_samples().count(), 0);
}

#[test]
fn test_no_kinds_requested() {
    let err = decode_samples(&fixture("gpu_power.xml"), &[]).unwrap_err();
    assert!(matches!(err.fallback, DecodeError::NoSampleKinds));
}
