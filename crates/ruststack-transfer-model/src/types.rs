//! Small value types shared by inputs and outputs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An inclusive byte range `[start, end]` within an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange {
    /// First byte offset.
    pub start: u64,
    /// Last byte offset (inclusive).
    pub end: u64,
}

impl ByteRange {
    /// Create a range. `start` must not exceed `end`.
    #[must_use]
    pub fn new(start: u64, end: u64) -> Self {
        debug_assert!(start <= end, "byte range start {start} > end {end}");
        Self { start, end }
    }

    /// Number of bytes covered.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Always false; a range covers at least one byte.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Renders as an HTTP range header value, `bytes=start-end`.
impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bytes={}-{}", self.start, self.end)
    }
}

/// A part copied under a multipart session, as listed in the completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedPart {
    /// 1-based part number.
    pub part_number: u32,
    /// Entity tag returned by the part copy.
    pub etag: String,
}

/// A `(key, version)` entry in a bulk delete.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectIdentifier {
    /// Object key.
    pub key: String,
    /// Specific version to delete; `None` targets the current version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_render_range_header() {
        let range = ByteRange::new(0, 5_242_879);
        assert_eq!(range.to_string(), "bytes=0-5242879");
        assert_eq!(range.len(), 5_242_880);
    }

    #[test]
    fn test_should_count_single_byte_range() {
        let range = ByteRange::new(7, 7);
        assert_eq!(range.len(), 1);
        assert!(!range.is_empty());
    }
}
