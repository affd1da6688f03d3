//! Document decoder: one plist document into one typed sample.
//!
//! The caller picks the [`SampleKind`]; nothing here sniffs which sampler a
//! document came from. Unknown keys are ignored so new powermetrics fields do
//! not break decoding.

use super::plist::{parse_document, Dictionary, PlistValue};
use super::schema::{
    BaseSample, BatteryInfo, BatterySample, DvfmState, GpuInfo, GpuPowerSample, Ratio, Sample,
    SampleKind, SwRequestedState, SwState,
};
use crate::utils::error::DecodeError;
use chrono::{DateTime, Utc};
use log::warn;

/// Decode one plist document into a sample of the given kind
///
/// **Public** - main entry point for single-document decoding
///
/// # Arguments
/// * `document` - Bytes of exactly one plist document
/// * `kind` - Sampler payload to decode
///
/// # Errors
/// Any [`DecodeError`]; there is no partial result.
pub fn decode_document(document: &[u8], kind: SampleKind) -> Result<Sample, DecodeError> {
    let root = parse_document(document)?;
    decode_value(&root, kind)
}

/// Decode an already parsed plist tree
///
/// **Public** - lets one parsed document be decoded for several kinds
pub fn decode_value(root: &PlistValue, kind: SampleKind) -> Result<Sample, DecodeError> {
    let root = DictReader::root(root)?;
    let base = decode_base(&root)?;
    let payload = root.dict(kind.payload_key())?;

    match kind {
        SampleKind::GpuPower => Ok(Sample::GpuPower(GpuPowerSample {
            base,
            gpu: decode_gpu(&payload)?,
        })),
        SampleKind::Battery => Ok(Sample::Battery(BatterySample {
            base,
            battery: decode_battery(&payload)?,
        })),
    }
}

fn decode_base(root: &DictReader<'_>) -> Result<BaseSample, DecodeError> {
    let elapsed_ns = root.i64("elapsed_ns")?;
    if elapsed_ns < 0 {
        return Err(DecodeError::OutOfRange {
            field: root.path("elapsed_ns"),
            value: elapsed_ns.to_string(),
        });
    }

    let timestamp = root.date("timestamp")?;
    // Zero-value sentinel: not a real sample time
    if timestamp.timestamp() <= 0 {
        return Err(DecodeError::OutOfRange {
            field: root.path("timestamp"),
            value: timestamp.to_rfc3339(),
        });
    }

    Ok(BaseSample {
        is_delta: root.bool("is_delta")?,
        elapsed_ns,
        hw_model: root.string("hw_model")?,
        kern_osversion: root.string("kern_osversion")?,
        kern_bootargs: root.string("kern_bootargs")?,
        kern_boottime: root.i64("kern_boottime")?,
        timestamp,
    })
}

fn decode_gpu(gpu: &DictReader<'_>) -> Result<GpuInfo, DecodeError> {
    let idle_ratio = gpu.ratio("idle_ratio")?;

    let dvfm_states = gpu
        .dicts("dvfm_states")?
        .iter()
        .map(|state| {
            Ok(DvfmState {
                freq: state.i64("freq")?,
                used_ns: state.i64("used_ns")?,
                used_ratio: state.ratio("used_ratio")?,
            })
        })
        .collect::<Result<Vec<_>, DecodeError>>()?;

    let sw_requested_states = gpu
        .dicts("sw_requested_state")?
        .iter()
        .map(|state| {
            Ok(SwRequestedState {
                label: state.string("sw_req_state")?,
                used_ns: state.i64("used_ns")?,
                used_ratio: state.ratio("used_ratio")?,
            })
        })
        .collect::<Result<Vec<_>, DecodeError>>()?;

    let sw_states = gpu
        .dicts("sw_state")?
        .iter()
        .map(|state| {
            Ok(SwState {
                label: state.string("sw_state")?,
                used_ns: state.i64("used_ns")?,
                used_ratio: state.ratio("used_ratio")?,
            })
        })
        .collect::<Result<Vec<_>, DecodeError>>()?;

    Ok(GpuInfo {
        freq_hz: gpu.f64("freq_hz")?,
        idle_ns: gpu.i64("idle_ns")?,
        idle_ratio,
        dvfm_states,
        sw_requested_states,
        sw_states,
        energy_mw: gpu.optional_i64("gpu_energy")?,
    })
}

fn decode_battery(battery: &DictReader<'_>) -> Result<BatteryInfo, DecodeError> {
    Ok(BatteryInfo {
        percent_charge: battery.i64("percent_charge")?,
    })
}

/// Typed field access on a dictionary, tracking the field path for errors
struct DictReader<'a> {
    dict: &'a Dictionary,
    prefix: String,
}

impl<'a> DictReader<'a> {
    fn root(value: &'a PlistValue) -> Result<Self, DecodeError> {
        match value {
            PlistValue::Dictionary(dict) => Ok(Self {
                dict,
                prefix: String::new(),
            }),
            other => Err(DecodeError::TypeMismatch {
                field: "<root>".to_string(),
                expected: "dict",
                found: other.type_name(),
            }),
        }
    }

    fn path(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    fn required(&self, key: &str) -> Result<&'a PlistValue, DecodeError> {
        self.dict
            .get(key)
            .ok_or_else(|| DecodeError::MissingField(self.path(key)))
    }

    fn mismatch(&self, key: &str, expected: &'static str, found: &PlistValue) -> DecodeError {
        DecodeError::TypeMismatch {
            field: self.path(key),
            expected,
            found: found.type_name(),
        }
    }

    fn bool(&self, key: &str) -> Result<bool, DecodeError> {
        match self.required(key)? {
            PlistValue::Boolean(value) => Ok(*value),
            other => Err(self.mismatch(key, "boolean", other)),
        }
    }

    fn i64(&self, key: &str) -> Result<i64, DecodeError> {
        self.integer_value(key, self.required(key)?)
    }

    fn optional_i64(&self, key: &str) -> Result<Option<i64>, DecodeError> {
        self.dict
            .get(key)
            .map(|value| self.integer_value(key, value))
            .transpose()
    }

    fn integer_value(&self, key: &str, value: &PlistValue) -> Result<i64, DecodeError> {
        match value {
            PlistValue::Integer(value) => Ok(*value),
            other => Err(self.mismatch(key, "integer", other)),
        }
    }

    /// Reals also accept integer leaves
    fn f64(&self, key: &str) -> Result<f64, DecodeError> {
        match self.required(key)? {
            PlistValue::Real(value) => Ok(*value),
            PlistValue::Integer(value) => Ok(*value as f64),
            other => Err(self.mismatch(key, "real", other)),
        }
    }

    fn ratio(&self, key: &str) -> Result<Ratio, DecodeError> {
        let ratio = Ratio::new(self.f64(key)?);
        if !ratio.is_valid() {
            warn!("{} outside [0, 1]: {}", self.path(key), ratio.get());
        }
        Ok(ratio)
    }

    fn string(&self, key: &str) -> Result<String, DecodeError> {
        match self.required(key)? {
            PlistValue::String(value) => Ok(value.clone()),
            other => Err(self.mismatch(key, "string", other)),
        }
    }

    fn date(&self, key: &str) -> Result<DateTime<Utc>, DecodeError> {
        match self.required(key)? {
            PlistValue::Date(value) => Ok(*value),
            other => Err(self.mismatch(key, "date", other)),
        }
    }

    fn dict(&self, key: &str) -> Result<DictReader<'a>, DecodeError> {
        match self.required(key)? {
            PlistValue::Dictionary(dict) => Ok(DictReader {
                dict,
                prefix: format!("{}.", self.path(key)),
            }),
            other => Err(self.mismatch(key, "dict", other)),
        }
    }

    /// An array whose every element is a dictionary
    fn dicts(&self, key: &str) -> Result<Vec<DictReader<'a>>, DecodeError> {
        let items = match self.required(key)? {
            PlistValue::Array(items) => items,
            other => return Err(self.mismatch(key, "array", other)),
        };

        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let element = format!("{}[{}]", key, index);
                match item {
                    PlistValue::Dictionary(dict) => Ok(DictReader {
                        dict,
                        prefix: format!("{}.", self.path(&element)),
                    }),
                    other => Err(self.mismatch(&element, "dict", other)),
                }
            })
            .collect()
    }
}
