//! Typed sample records decoded from powermetrics plist output.
//!
//! Every sample is a [`BaseSample`] envelope plus exactly one sampler payload.
//! These types are also the JSON export schema, so fields are only ever added.

use crate::utils::config::SCHEMA_VERSION;
use chrono::{DateTime, Utc};
use serde::de::{self, Unexpected, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Fields present in every powermetrics sample regardless of sampler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseSample {
    /// Counters are deltas since the previous sample (true) or since boot
    pub is_delta: bool,

    /// Duration covered by this sample, in nanoseconds
    pub elapsed_ns: i64,

    /// Hardware model identifier (e.g. "Mac14,2")
    pub hw_model: String,

    /// Kernel build version
    pub kern_osversion: String,

    /// Kernel boot arguments (often empty)
    pub kern_bootargs: String,

    /// Kernel boot time as reported by the tool
    pub kern_boottime: i64,

    /// When the sample was taken
    pub timestamp: DateTime<Utc>,
}

/// A fraction that should lie in `[0, 1]`
///
/// The raw value is kept exactly as decoded. Out-of-range, NaN and infinite
/// values are reported through [`Ratio::is_valid`], never clamped.
///
/// Serialized as a JSON number, or as `"NaN"`, `"inf"` or `"-inf"` when not
/// finite, since JSON has no literal for those.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ratio(f64);

impl Ratio {
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    /// Raw decoded value, valid or not
    pub fn get(self) -> f64 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self.0.is_finite() && (0.0..=1.0).contains(&self.0)
    }

    /// The value if it is a usable ratio
    pub fn valid(self) -> Option<f64> {
        self.is_valid().then_some(self.0)
    }
}

impl Serialize for Ratio {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0.is_nan() {
            serializer.serialize_str("NaN")
        } else if self.0 == f64::INFINITY {
            serializer.serialize_str("inf")
        } else if self.0 == f64::NEG_INFINITY {
            serializer.serialize_str("-inf")
        } else {
            serializer.serialize_f64(self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Ratio {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RatioVisitor)
    }
}

struct RatioVisitor;

impl<'de> Visitor<'de> for RatioVisitor {
    type Value = Ratio;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number or one of \"NaN\", \"inf\", \"-inf\"")
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Ratio, E> {
        Ok(Ratio(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Ratio, E> {
        Ok(Ratio(value as f64))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Ratio, E> {
        Ok(Ratio(value as f64))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Ratio, E> {
        match value {
            "NaN" => Ok(Ratio(f64::NAN)),
            "inf" => Ok(Ratio(f64::INFINITY)),
            "-inf" => Ok(Ratio(f64::NEG_INFINITY)),
            other => Err(E::invalid_value(Unexpected::Str(other), &self)),
        }
    }
}

/// GPU payload from the `gpu_power` sampler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpuInfo {
    /// Average active frequency over the sample
    pub freq_hz: f64,

    pub idle_ns: i64,

    pub idle_ratio: Ratio,

    /// Residency per hardware DVFM frequency state
    pub dvfm_states: Vec<DvfmState>,

    /// Residency per software-requested performance state
    pub sw_requested_states: Vec<SwRequestedState>,

    /// Residency per software performance state
    pub sw_states: Vec<SwState>,

    /// Only reported on hardware that exposes GPU energy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_mw: Option<i64>,
}

impl GpuInfo {
    /// Fraction of the sample the GPU was busy, if the idle ratio is usable
    pub fn active_ratio(&self) -> Option<f64> {
        self.idle_ratio.valid().map(|idle| 1.0 - idle)
    }
}

/// Hardware frequency state residency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DvfmState {
    pub freq: i64,
    pub used_ns: i64,
    pub used_ratio: Ratio,
}

/// Software-requested performance state residency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwRequestedState {
    pub label: String,
    pub used_ns: i64,
    pub used_ratio: Ratio,
}

/// Software performance state residency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwState {
    pub label: String,
    pub used_ns: i64,
    pub used_ratio: Ratio,
}

/// Battery payload from the `battery` sampler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatteryInfo {
    /// Nominally 0-100; not range checked
    pub percent_charge: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpuPowerSample {
    pub base: BaseSample,
    pub gpu: GpuInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatterySample {
    pub base: BaseSample,
    pub battery: BatteryInfo,
}

/// Which payload a document should be decoded into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleKind {
    GpuPower,
    Battery,
}

impl SampleKind {
    /// Key of the payload dictionary inside a document
    pub fn payload_key(self) -> &'static str {
        match self {
            Self::GpuPower => "gpu",
            Self::Battery => "battery",
        }
    }
}

/// One decoded sample of a known kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "sampler", rename_all = "snake_case")]
pub enum Sample {
    GpuPower(GpuPowerSample),
    Battery(BatterySample),
}

impl Sample {
    pub fn kind(&self) -> SampleKind {
        match self {
            Self::GpuPower(_) => SampleKind::GpuPower,
            Self::Battery(_) => SampleKind::Battery,
        }
    }

    pub fn base(&self) -> &BaseSample {
        match self {
            Self::GpuPower(sample) => &sample.base,
            Self::Battery(sample) => &sample.base,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.base().timestamp
    }

    pub fn as_gpu(&self) -> Option<&GpuPowerSample> {
        match self {
            Self::GpuPower(sample) => Some(sample),
            _ => None,
        }
    }

    pub fn as_battery(&self) -> Option<&BatterySample> {
        match self {
            Self::Battery(sample) => Some(sample),
            _ => None,
        }
    }
}

/// Ordered samples from one collection run (document order)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultCollection {
    samples: Vec<Sample>,
}

impl ResultCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    pub fn as_slice(&self) -> &[Sample] {
        &self.samples
    }

    /// First decoded sample; not necessarily the most recent
    pub fn primary(&self) -> Option<&Sample> {
        self.samples.first()
    }

    /// Last decoded sample
    pub fn latest(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// All GPU samples, in document order
    pub fn gpu_samples(&self) -> impl Iterator<Item = &GpuPowerSample> + '_ {
        self.samples.iter().filter_map(Sample::as_gpu)
    }

    /// All battery samples, in document order
    pub fn battery_samples(&self) -> impl Iterator<Item = &BatterySample> + '_ {
        self.samples.iter().filter_map(Sample::as_battery)
    }
}

impl<'a> IntoIterator for &'a ResultCollection {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

impl IntoIterator for ResultCollection {
    type Item = Sample;
    type IntoIter = std::vec::IntoIter<Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.into_iter()
    }
}

/// Top-level JSON export written by the output layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleReport {
    /// Schema version for compatibility checking
    pub version: String,

    /// When the report was generated (RFC 3339)
    pub generated_at: String,

    pub sample_count: usize,

    pub samples: ResultCollection,
}

impl SampleReport {
    /// Wrap decoded samples for export, stamped with the current time
    pub fn new(samples: ResultCollection) -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            generated_at: Utc::now().to_rfc3339(),
            sample_count: samples.len(),
            samples,
        }
    }
}
