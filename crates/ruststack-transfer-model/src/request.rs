//! Caller-supplied transfer requests.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::location::ObjectLocation;

/// Per-item attribute overrides applied to the destination object.
///
/// Any field left as `None` is taken from the source object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectOverrides {
    /// Storage class for the destination (e.g. `STANDARD_IA`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_class: Option<String>,
    /// Tag set replacing the source tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, String>>,
    /// User metadata replacing the source metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, String>>,
    /// Content type replacing the source content type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Object lock mode (`GOVERNANCE` or `COMPLIANCE`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_lock_mode: Option<String>,
    /// Object lock retain-until date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_lock_retain_until: Option<DateTime<Utc>>,
    /// Object lock legal hold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_lock_legal_hold: Option<bool>,
}

impl ObjectOverrides {
    /// Whether any lock-retention field is set.
    #[must_use]
    pub fn has_lock_retention(&self) -> bool {
        self.object_lock_mode.is_some()
            || self.object_lock_retain_until.is_some()
            || self.object_lock_legal_hold.is_some()
    }
}

/// One object to copy or move.
///
/// Immutable once handed to the engine; the engine only ever borrows it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    /// Object to read.
    pub source: ObjectLocation,
    /// Object to write.
    pub destination: ObjectLocation,
    /// Optional per-item overrides.
    #[serde(default)]
    pub overrides: ObjectOverrides,
}

impl TransferRequest {
    /// Create a request with no overrides.
    #[must_use]
    pub fn new(source: ObjectLocation, destination: ObjectLocation) -> Self {
        Self {
            source,
            destination,
            overrides: ObjectOverrides::default(),
        }
    }

    /// Attach overrides.
    #[must_use]
    pub fn with_overrides(mut self, overrides: ObjectOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Whether the source and destination address the same object.
    ///
    /// Such a request must never be executed as a move, since deleting the
    /// source would delete the only copy.
    #[must_use]
    pub fn is_source_destination_same(&self) -> bool {
        self.source.is_same_object(&self.destination)
    }
}
