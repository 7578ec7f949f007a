//! Object addressing.

use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};

/// Characters left unescaped in a copy-source key (RFC 3986 unreserved plus `/`).
const COPY_SOURCE_KEY: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// A `(bucket, key)` pair addressing one object in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectLocation {
    /// Bucket name.
    pub bucket: String,
    /// Object key.
    pub key: String,
}

impl ObjectLocation {
    /// Create a new location.
    #[must_use]
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Whether `self` and `other` address the same object.
    ///
    /// Bucket names compare case-insensitively, keys case-sensitively.
    ///
    /// # Examples
    ///
    /// ```
    /// use ruststack_transfer_model::ObjectLocation;
    ///
    /// let a = ObjectLocation::new("Photos", "a.jpg");
    /// assert!(a.is_same_object(&ObjectLocation::new("photos", "a.jpg")));
    /// assert!(!a.is_same_object(&ObjectLocation::new("photos", "A.jpg")));
    /// ```
    #[must_use]
    pub fn is_same_object(&self, other: &Self) -> bool {
        self.bucket.eq_ignore_ascii_case(&other.bucket) && self.key == other.key
    }

    /// The `bucket/key` form used in `x-amz-copy-source`, with the key
    /// percent-encoded.
    #[must_use]
    pub fn copy_source(&self, version_id: Option<&str>) -> String {
        let key = utf8_percent_encode(&self.key, COPY_SOURCE_KEY);
        match version_id {
            Some(v) => format!("{}/{key}?versionId={v}", self.bucket),
            None => format!("{}/{key}", self.bucket),
        }
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}
