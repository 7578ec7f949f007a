//! Outputs returned by object store operations.
//!
//! Operations that the store can answer with a non-success status without
//! raising an error carry an explicit [`StatusCode`]; callers must check it.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use http::StatusCode;
use serde::{Deserialize, Serialize};

/// Source object metadata, as returned by a `HEAD`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMetadata {
    /// Object size in bytes.
    pub size: u64,
    /// Current version id, if the bucket is versioned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_id: Option<String>,
    /// Entity tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    /// Content type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Storage class.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,
    /// User metadata.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// Result of a single-shot copy or of a completed multipart copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyObjectOutput {
    /// Status reported by the store.
    pub status: StatusCode,
    /// Version id attached to the outcome.
    pub version_id: Option<String>,
    /// Entity tag of the destination object.
    pub etag: Option<String>,
}

impl CopyObjectOutput {
    /// Map a multipart completion into a copy result.
    ///
    /// The version id is the source version captured before the transfer,
    /// not whatever the completion response reports.
    #[must_use]
    pub fn from_completion(
        completion: CompleteMultipartUploadOutput,
        source_version_id: Option<String>,
    ) -> Self {
        Self {
            status: completion.status,
            version_id: source_version_id,
            etag: completion.etag,
        }
    }
}

/// Result of starting a multipart session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateMultipartUploadOutput {
    /// Session id.
    pub upload_id: String,
}

/// Result of copying one part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPartCopyOutput {
    /// Part number echoed back.
    pub part_number: u32,
    /// Entity tag of the part.
    pub etag: String,
}

/// Result of completing a multipart session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompleteMultipartUploadOutput {
    /// Status reported by the store.
    pub status: StatusCode,
    /// Entity tag of the assembled object.
    pub etag: Option<String>,
    /// Destination version id, if any.
    pub version_id: Option<String>,
}

/// Result of aborting a multipart session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbortMultipartUploadOutput {
    /// Status reported by the store.
    pub status: StatusCode,
}

/// Result of a single delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteObjectOutput {
    /// Status reported by the store.
    pub status: StatusCode,
}

/// One key the bulk delete removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedObject {
    /// Deleted key.
    pub key: String,
    /// Deleted version.
    pub version_id: Option<String>,
}

/// One key the bulk delete could not remove.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteObjectError {
    /// Key that failed.
    pub key: String,
    /// Version that failed.
    pub version_id: Option<String>,
    /// Error code from the store (e.g. `AccessDenied`).
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

/// Per-key results of a bulk delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteObjectsOutput {
    /// Keys removed.
    pub deleted: Vec<DeletedObject>,
    /// Keys not removed.
    pub errors: Vec<DeleteObjectError>,
}

/// One entry of an object listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectSummary {
    /// Object key.
    pub key: String,
    /// Size in bytes.
    pub size: u64,
    /// Entity tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    /// Last modification time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}

/// One page of an object listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListObjectsOutput {
    /// Objects on this page.
    pub objects: Vec<ObjectSummary>,
    /// Token for the next page; `None` when the listing is exhausted.
    pub next_continuation_token: Option<String>,
}
