//! Sample orchestrator.
//!
//! Reconciles the two shapes powermetrics output can take: a stream of many
//! concatenated documents, or a single document. The stream interpretation is
//! tried first; the whole buffer is decoded as one document only if that
//! yields nothing.

use super::decoder::decode_value;
use super::plist::parse_document;
use super::schema::{ResultCollection, Sample, SampleKind};
use super::splitter::split_documents;
use crate::utils::error::{DecodeError, NoValidDocumentsError};
use log::{debug, info};

/// How the samples in a [`DecodedSamples`] were obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodePath {
    /// Marker-delimited candidates decoded individually
    MultiDocument,
    /// The whole buffer decoded as one document
    SingleDocument,
}

/// Result of decoding one raw powermetrics buffer
#[derive(Debug, Clone)]
pub struct DecodedSamples {
    pub samples: ResultCollection,
    pub path: DecodePath,
    /// Candidates rejected during the multi-document pass
    pub skipped: usize,
}

impl DecodedSamples {
    /// First sample in document order
    pub fn primary(&self) -> Option<&Sample> {
        self.samples.primary()
    }
}

/// Decode every sample in a raw powermetrics buffer
///
/// **Public** - main entry point for stream decoding
///
/// # Arguments
/// * `output` - Raw bytes written by powermetrics
/// * `kinds` - Sampler payloads to decode from each document, in order
///
/// # Returns
/// Samples in document order; each document contributes one sample per kind
/// that decoded
///
/// # Errors
/// * `NoValidDocumentsError` - no candidate decoded and neither did the whole
///   buffer
pub fn decode_samples(
    output: &[u8],
    kinds: &[SampleKind],
) -> Result<DecodedSamples, NoValidDocumentsError> {
    let mut samples = ResultCollection::new();
    let mut candidates = 0;
    let mut skipped = 0;

    for (index, candidate) in split_documents(output).enumerate() {
        candidates += 1;
        match decode_candidate(candidate, kinds) {
            Ok(decoded) => decoded.into_iter().for_each(|sample| samples.push(sample)),
            Err(e) => {
                skipped += 1;
                debug!("Skipping document {} ({} bytes): {}", index, candidate.len(), e);
            }
        }
    }

    if !samples.is_empty() {
        info!(
            "Decoded {} sample(s) from {} document(s), {} skipped",
            samples.len(),
            candidates,
            skipped
        );
        return Ok(DecodedSamples {
            samples,
            path: DecodePath::MultiDocument,
            skipped,
        });
    }

    debug!(
        "No sample from {} candidate(s), decoding whole buffer as one document",
        candidates
    );

    match decode_candidate(output, kinds) {
        Ok(decoded) => {
            decoded.into_iter().for_each(|sample| samples.push(sample));
            info!("Decoded {} sample(s) from single document", samples.len());
            Ok(DecodedSamples {
                samples,
                path: DecodePath::SingleDocument,
                skipped,
            })
        }
        Err(fallback) => Err(NoValidDocumentsError {
            candidates,
            fallback,
        }),
    }
}

/// Parse once, then decode each requested kind
///
/// **Private** - fails only if no kind decodes
fn decode_candidate(document: &[u8], kinds: &[SampleKind]) -> Result<Vec<Sample>, DecodeError> {
    let root = parse_document(document)?;
    let mut decoded = Vec::with_capacity(kinds.len());
    let mut last_error = DecodeError::NoSampleKinds;

    for &kind in kinds {
        match decode_value(&root, kind) {
            Ok(sample) => decoded.push(sample),
            Err(e) => {
                debug!("Document has no valid {:?} payload: {}", kind, e);
                last_error = e;
            }
        }
    }

    if decoded.is_empty() {
        Err(last_error)
    } else {
        Ok(decoded)
    }
}
