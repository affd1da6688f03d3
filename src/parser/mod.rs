//! Sample decoding and schema definitions.
//!
//! This module handles:
//! - Reading XML plist documents into a value tree
//! - Decoding one document into a typed sample
//! - Splitting a stream of concatenated documents
//! - Orchestrating multi-document decoding with single-document fallback

pub mod decoder;
pub mod plist;
pub mod samples;
pub mod schema;
pub mod splitter;

// Re-export main types
pub use decoder::{decode_document, decode_value};
pub use plist::{parse_document, PlistValue};
pub use samples::{decode_samples, DecodePath, DecodedSamples};
pub use schema::{
    BaseSample, BatteryInfo, BatterySample, DvfmState, GpuInfo, GpuPowerSample, Ratio,
    ResultCollection, Sample, SampleKind, SampleReport, SwRequestedState, SwState,
};
pub use splitter::{find_next_boundary, split_documents, DocumentSplitter};
