//! Collection configuration: output format, samplers, sample count and rate.

use crate::parser::SampleKind;
use crate::utils::config::{
    COMMAND_TIMEOUT_SLACK, DEFAULT_SAMPLE_COUNT, DEFAULT_SAMPLE_INTERVAL,
};
use crate::utils::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// powermetrics output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    Text,
    Plist,
}

impl Format {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Plist => "plist",
        }
    }
}

impl FromStr for Format {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "plist" => Ok(Self::Plist),
            _ => Err(ConfigError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A powermetrics sampler we know how to decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sampler {
    GpuPower,
    Battery,
}

impl Sampler {
    /// Every supported sampler, in display order
    pub const ALL: [Sampler; 2] = [Sampler::GpuPower, Sampler::Battery];

    /// Name passed to `--samplers`
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GpuPower => "gpu_power",
            Self::Battery => "battery",
        }
    }

    pub fn sample_kind(self) -> SampleKind {
        match self {
            Self::GpuPower => SampleKind::GpuPower,
            Self::Battery => SampleKind::Battery,
        }
    }
}

impl FromStr for Sampler {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sampler| sampler.as_str() == s.trim())
            .ok_or_else(|| ConfigError::UnsupportedSampler(s.to_string()))
    }
}

impl fmt::Display for Sampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Names of all supported samplers
pub fn supported_samplers() -> Vec<&'static str> {
    Sampler::ALL.iter().map(|sampler| sampler.as_str()).collect()
}

/// Check sampler names against the allow-list
///
/// An empty list is valid here; [`Config::validate`] decides whether a run
/// may have no samplers.
pub fn validate_samplers<S: AsRef<str>>(names: &[S]) -> Result<Vec<Sampler>, ConfigError> {
    names.iter().map(|name| name.as_ref().parse()).collect()
}

pub fn validate_format(name: &str) -> Result<Format, ConfigError> {
    name.parse()
}

/// Configuration for one powermetrics run
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub sample_count: u32,

    /// Time between samples; zero leaves the tool's default rate
    pub sample_interval: Duration,

    pub format: Format,

    pub samplers: Vec<Sampler>,

    /// Overrides the timeout derived from count and interval
    pub timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sample_count: DEFAULT_SAMPLE_COUNT,
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            format: Format::Text,
            samplers: vec![Sampler::GpuPower],
            timeout: None,
        }
    }
}

impl Config {
    /// Plist GPU sampling with this config's count, interval and timeout
    pub fn gpu(&self) -> Self {
        Self {
            format: Format::Plist,
            samplers: vec![Sampler::GpuPower],
            ..self.clone()
        }
    }

    pub fn with_samplers(mut self, samplers: Vec<Sampler>) -> Self {
        self.samplers = samplers;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_count == 0 {
            return Err(ConfigError::InvalidSampleCount(self.sample_count));
        }

        if self.samplers.is_empty() {
            return Err(ConfigError::NoSamplers);
        }

        Ok(())
    }

    /// Payload kinds to decode, one per configured sampler
    pub fn sample_kinds(&self) -> Vec<SampleKind> {
        self.samplers.iter().map(|sampler| sampler.sample_kind()).collect()
    }

    /// Command-line arguments for powermetrics
    pub fn to_args(&self) -> Vec<String> {
        let samplers: Vec<&str> = self.samplers.iter().map(|s| s.as_str()).collect();

        let mut args = vec![
            format!("--sample-count={}", self.sample_count),
            format!("--format={}", self.format),
            format!("--samplers={}", samplers.join(",")),
        ];

        if !self.sample_interval.is_zero() {
            args.push(format!("--sample-rate={}", self.sample_interval.as_millis()));
        }

        args
    }

    /// How long to wait for powermetrics before giving up
    pub fn command_timeout(&self) -> Duration {
        self.timeout.unwrap_or_else(|| {
            // Without --sample-rate powermetrics uses its own default interval
            let interval = if self.sample_interval.is_zero() {
                DEFAULT_SAMPLE_INTERVAL
            } else {
                self.sample_interval
            };
            interval
                .saturating_mul(self.sample_count)
                .saturating_add(COMMAND_TIMEOUT_SLACK)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.sample_count, 1);
        assert_eq!(config.sample_interval, Duration::from_secs(5));
        assert_eq!(config.format, Format::Text);
        assert_eq!(config.samplers, vec![Sampler::GpuPower]);
    }

    #[test]
    fn test_gpu_keeps_count_and_interval() {
        let config = Config {
            sample_count: 5,
            sample_interval: Duration::from_secs(1),
            ..Default::default()
        }
        .gpu();

        assert_eq!(config.sample_count, 5);
        assert_eq!(config.sample_interval, Duration::from_secs(1));
        assert_eq!(config.format, Format::Plist);
    }

    #[test]
    fn test_to_args() {
        let config = Config {
            sample_count: 3,
            sample_interval: Duration::from_millis(1500),
            format: Format::Plist,
            samplers: vec![Sampler::GpuPower, Sampler::Battery],
            timeout: None,
        };

        assert_eq!(
            config.to_args(),
            vec![
                "--sample-count=3",
                "--format=plist",
                "--samplers=gpu_power,battery",
                "--sample-rate=1500",
            ]
        );
    }

    #[test]
    fn test_to_args_without_interval() {
        let config = Config {
            sample_interval: Duration::ZERO,
            ..Default::default()
        };
        assert!(!config.to_args().iter().any(|arg| arg.starts_with("--sample-rate")));
    }

    #[test]
    fn test_command_timeout() {
        let config = Config {
            sample_count: 4,
            sample_interval: Duration::from_secs(2),
            ..Default::default()
        };
        assert_eq!(config.command_timeout(), Duration::from_secs(18));

        let overridden = Config {
            timeout: Some(Duration::from_secs(1)),
            ..config
        };
        assert_eq!(overridden.command_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_command_timeout_without_interval() {
        let config = Config {
            sample_count: 3,
            sample_interval: Duration::ZERO,
            ..Default::default()
        };
        assert_eq!(config.command_timeout(), Duration::from_secs(25));
    }

    #[test]
    fn test_supported_samplers() {
        assert_eq!(supported_samplers(), vec!["gpu_power", "battery"]);
        for name in supported_samplers() {
            assert_eq!(name.parse::<Sampler>().unwrap().as_str(), name);
        }
    }

    #[test]
    fn test_validate() {
        assert!(Config::default().validate().is_ok());

        let zero = Config {
            sample_count: 0,
            ..Default::default()
        };
        assert_eq!(zero.validate(), Err(ConfigError::InvalidSampleCount(0)));

        let empty = Config::default().with_samplers(Vec::new());
        assert_eq!(empty.validate(), Err(ConfigError::NoSamplers));
    }
}
