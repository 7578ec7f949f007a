//! Inputs for each object store operation the transfer engine issues.
//!
//! Every transition from a [`TransferRequest`] into an operation input goes
//! through one of the constructors here, so the set of fields carried across
//! each step is fixed at compile time.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};

use crate::location::ObjectLocation;
use crate::output::ObjectMetadata;
use crate::request::TransferRequest;
use crate::types::{ByteRange, CompletedPart, ObjectIdentifier};

/// Attributes written onto a destination object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectAttributes {
    /// Storage class.
    pub storage_class: Option<String>,
    /// Tag set.
    pub tags: Option<BTreeMap<String, String>>,
    /// User metadata.
    pub metadata: Option<BTreeMap<String, String>>,
    /// Content type.
    pub content_type: Option<String>,
    /// Object lock mode.
    pub object_lock_mode: Option<String>,
    /// Object lock retain-until date.
    pub object_lock_retain_until: Option<DateTime<Utc>>,
    /// Object lock legal hold.
    pub object_lock_legal_hold: Option<bool>,
}

impl ObjectAttributes {
    /// Encode the tag set as an `x-amz-tagging` header value.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::collections::BTreeMap;
    /// use ruststack_transfer_model::input::ObjectAttributes;
    ///
    /// let attrs = ObjectAttributes {
    ///     tags: Some(BTreeMap::from([("env".to_owned(), "prod east".to_owned())])),
    ///     ..ObjectAttributes::default()
    /// };
    /// assert_eq!(attrs.tagging_header().as_deref(), Some("env=prod%20east"));
    /// ```
    #[must_use]
    pub fn tagging_header(&self) -> Option<String> {
        self.tags.as_ref().map(|tags| {
            tags.iter()
                .map(|(k, v)| {
                    format!(
                        "{}={}",
                        utf8_percent_encode(k, NON_ALPHANUMERIC),
                        utf8_percent_encode(v, NON_ALPHANUMERIC)
                    )
                })
                .collect::<Vec<_>>()
                .join("&")
        })
    }

    /// Whether any field replaces what a plain copy would preserve.
    #[must_use]
    pub fn replaces_metadata(&self) -> bool {
        self.metadata.is_some() || self.content_type.is_some()
    }
}

/// Input for a single-shot server-side copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyObjectInput {
    /// Source object.
    pub source: ObjectLocation,
    /// Pinned source version, when the source is versioned.
    pub source_version_id: Option<String>,
    /// Destination object.
    pub destination: ObjectLocation,
    /// Attribute overrides; unset fields are preserved from the source.
    pub attributes: ObjectAttributes,
}

impl CopyObjectInput {
    /// Build from a request and the version captured by the metadata fetch.
    #[must_use]
    pub fn from_request(request: &TransferRequest, source_version_id: Option<&str>) -> Self {
        let o = &request.overrides;
        Self {
            source: request.source.clone(),
            source_version_id: source_version_id.map(str::to_owned),
            destination: request.destination.clone(),
            attributes: ObjectAttributes {
                storage_class: o.storage_class.clone(),
                tags: o.tags.clone(),
                metadata: o.metadata.clone(),
                content_type: o.content_type.clone(),
                object_lock_mode: o.object_lock_mode.clone(),
                object_lock_retain_until: o.object_lock_retain_until,
                object_lock_legal_hold: o.object_lock_legal_hold,
            },
        }
    }

    /// When the copy replaces metadata, take the fields the request left
    /// unset from `source`, since a replacing copy keeps nothing.
    #[must_use]
    pub fn inheriting(mut self, source: &ObjectMetadata) -> Self {
        if self.attributes.replaces_metadata() {
            if self.attributes.metadata.is_none() {
                self.attributes.metadata = Some(source.metadata.clone());
            }
            if self.attributes.content_type.is_none() {
                self.attributes.content_type.clone_from(&source.content_type);
            }
        }
        self
    }
}

/// Input for starting a multipart session on the destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateMultipartUploadInput {
    /// Destination object.
    pub destination: ObjectLocation,
    /// Final object attributes. Never carries lock-retention fields.
    pub attributes: ObjectAttributes,
}

impl CreateMultipartUploadInput {
    /// Build from a request, filling unset attributes from the source.
    ///
    /// A multipart upload does not inherit anything from the copy source, so
    /// content type, user metadata and storage class are resolved here.
    /// Lock-retention fields are dropped.
    ///
    /// Source tags are not part of [`ObjectMetadata`] and are not fetched:
    /// the destination of a multipart copy carries only override tags, while
    /// a single copy keeps the source tag set unless tags are overridden.
    #[must_use]
    pub fn from_request(request: &TransferRequest, source: &ObjectMetadata) -> Self {
        let o = &request.overrides;
        Self {
            destination: request.destination.clone(),
            attributes: ObjectAttributes {
                storage_class: o
                    .storage_class
                    .clone()
                    .or_else(|| source.storage_class.clone()),
                tags: o.tags.clone(),
                metadata: o
                    .metadata
                    .clone()
                    .or_else(|| Some(source.metadata.clone()).filter(|m| !m.is_empty())),
                content_type: o
                    .content_type
                    .clone()
                    .or_else(|| source.content_type.clone()),
                object_lock_mode: None,
                object_lock_retain_until: None,
                object_lock_legal_hold: None,
            },
        }
    }
}

/// Input for copying one byte range of the source into a multipart session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPartCopyInput {
    /// Session the part belongs to.
    pub upload_id: String,
    /// Source object.
    pub source: ObjectLocation,
    /// Pinned source version.
    pub source_version_id: Option<String>,
    /// Destination object of the session.
    pub destination: ObjectLocation,
    /// Source bytes to copy.
    pub range: ByteRange,
    /// 1-based part number.
    pub part_number: u32,
}

impl UploadPartCopyInput {
    /// Build the copy of one part.
    #[must_use]
    pub fn for_part(
        request: &TransferRequest,
        source_version_id: Option<&str>,
        upload_id: &str,
        part_number: u32,
        range: ByteRange,
    ) -> Self {
        Self {
            upload_id: upload_id.to_owned(),
            source: request.source.clone(),
            source_version_id: source_version_id.map(str::to_owned),
            destination: request.destination.clone(),
            range,
            part_number,
        }
    }
}

/// Input for completing a multipart session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompleteMultipartUploadInput {
    /// Session to complete.
    pub upload_id: String,
    /// Destination object.
    pub destination: ObjectLocation,
    /// Parts in ascending part-number order.
    pub parts: Vec<CompletedPart>,
}

impl CompleteMultipartUploadInput {
    /// Build a completion request. Parts are sorted by part number, whatever
    /// order they arrive in.
    #[must_use]
    pub fn new(upload_id: &str, destination: &ObjectLocation, mut parts: Vec<CompletedPart>) -> Self {
        parts.sort_by_key(|p| p.part_number);
        Self {
            upload_id: upload_id.to_owned(),
            destination: destination.clone(),
            parts,
        }
    }
}

/// Input for aborting a multipart session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbortMultipartUploadInput {
    /// Session to abort.
    pub upload_id: String,
    /// Destination object.
    pub destination: ObjectLocation,
}

/// Input for deleting a single object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteObjectInput {
    /// Object to delete.
    pub location: ObjectLocation,
}

/// Input for a bulk delete within one bucket (at most 1000 keys).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteObjectsInput {
    /// Bucket holding every listed object.
    pub bucket: String,
    /// Objects to delete.
    pub objects: Vec<ObjectIdentifier>,
}

/// Input for one page of an object listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListObjectsInput {
    /// Bucket to list.
    pub bucket: String,
    /// Key prefix filter.
    pub prefix: Option<String>,
    /// Token returned by the previous page.
    pub continuation_token: Option<String>,
    /// Page size limit.
    pub max_keys: Option<u32>,
}
