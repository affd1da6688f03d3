//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while decoding a single plist document
///
/// A document either decodes completely or fails with one of these.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("XML syntax error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Character data is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("Document has no <plist> root element")]
    MissingRoot,

    #[error("Document is empty: <plist> holds no value")]
    EmptyDocument,

    #[error("Document ended before <{0}> was closed")]
    Truncated(String),

    #[error("Unexpected element <{found}>, expected {expected}")]
    UnexpectedElement { expected: &'static str, found: String },

    #[error("Unexpected character data: {0:?}")]
    UnexpectedText(String),

    #[error("Dictionary key '{0}' has no value")]
    MissingValue(String),

    #[error("Invalid <{element}> value: {value:?}")]
    InvalidLeaf { element: &'static str, value: String },

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Field '{field}' has type {found}, expected {expected}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("Field '{field}' is out of range: {value}")]
    OutOfRange { field: String, value: String },

    #[error("No sample kinds requested")]
    NoSampleKinds,
}

/// Neither the multi-document pass nor the whole-buffer fallback decoded a sample
#[derive(Error, Debug)]
#[error("No valid plist documents found ({candidates} candidate(s) rejected)")]
pub struct NoValidDocumentsError {
    /// Number of marker-delimited candidates that were tried and rejected
    pub candidates: usize,

    /// Why the whole-buffer fallback was rejected
    #[source]
    pub fallback: DecodeError,
}

/// Errors that can occur while validating a collection configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unsupported sampler: {0}")]
    UnsupportedSampler(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Sample count must be at least 1 (got {0})")]
    InvalidSampleCount(u32),

    #[error("At least one sampler must be configured")]
    NoSamplers,
}

/// Errors that can occur while running powermetrics and decoding its output
#[derive(Error, Debug)]
pub enum CollectError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with status {status:?}: {stderr}")]
    CommandFailed {
        program: String,
        status: Option<i32>,
        stderr: String,
    },

    /// The child was killed when the deadline passed
    #[error("{program} did not finish within {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    #[error(transparent)]
    NoValidDocuments(#[from] NoValidDocumentsError),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
