//! Stream splitter for concatenated plist documents.
//!
//! powermetrics writes one document per sample back to back, with no count or
//! length prefix. Boundaries are recovered from the XML declaration that opens
//! every document. The marker could in principle also occur inside a string
//! value; that would split a document in two and both halves would then fail
//! to decode.

use crate::utils::config::DOCUMENT_MARKER;

/// Offset of the next document marker at or after `from`
///
/// This is the only place that knows how documents are framed.
pub fn find_next_boundary(bytes: &[u8], from: usize) -> Option<usize> {
    bytes
        .get(from..)?
        .windows(DOCUMENT_MARKER.len())
        .position(|window| window == DOCUMENT_MARKER)
        .map(|offset| from + offset)
}

/// Lazily split a buffer into candidate documents
///
/// **Public** - used by the sample orchestrator
///
/// Each candidate starts at a marker and runs up to the next marker or the end
/// of input. Bytes before the first marker are dropped.
pub fn split_documents(bytes: &[u8]) -> DocumentSplitter<'_> {
    DocumentSplitter {
        bytes,
        next_start: find_next_boundary(bytes, 0),
    }
}

/// Iterator over candidate document slices, in stream order
#[derive(Debug, Clone)]
pub struct DocumentSplitter<'a> {
    bytes: &'a [u8],
    next_start: Option<usize>,
}

impl<'a> Iterator for DocumentSplitter<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.next_start?;
        self.next_start = find_next_boundary(self.bytes, start + DOCUMENT_MARKER.len());
        let end = self.next_start.unwrap_or(self.bytes.len());
        Some(&self.bytes[start..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_next_boundary() {
        let bytes = b"noise<?xml version=\"1.0\"?>";
        assert_eq!(find_next_boundary(bytes, 0), Some(5));
        assert_eq!(find_next_boundary(bytes, 5), Some(5));
        assert_eq!(find_next_boundary(bytes, 6), None);
        assert_eq!(find_next_boundary(bytes, 1000), None);
    }

    #[test]
    fn test_partial_marker_is_not_a_boundary() {
        assert_eq!(split_documents(b"<?xml vers").count(), 0);
    }
}
