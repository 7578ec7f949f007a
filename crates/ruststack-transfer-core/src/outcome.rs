//! Per-object outcomes and batch aggregation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use ruststack_transfer_model::{ObjectLocation, TransferRequest};

use crate::error::TransferError;

/// Which step of a transfer failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureStage {
    /// Fetching source metadata.
    Metadata,
    /// Copying (single or multipart).
    Copy,
    /// Deleting the source after a successful copy.
    Delete,
}

/// How an object was copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum TransferStrategy {
    /// One server-side copy call.
    Single,
    /// Multipart copy.
    Multipart {
        /// Number of parts.
        parts: u32,
    },
}

/// A completed transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSuccess {
    /// Version id of the outcome. For multipart copies this is the source
    /// version captured before the transfer.
    pub version_id: Option<String>,
    /// Entity tag of the destination object.
    pub etag: Option<String>,
    /// Bytes transferred.
    pub size: u64,
    /// Copy strategy used.
    pub strategy: TransferStrategy,
    /// Version of the source that was copied, used when deleting it.
    pub source_version_id: Option<String>,
}

/// A failed transfer.
#[derive(Debug)]
pub struct TransferFailure {
    /// The request that failed.
    pub request: TransferRequest,
    /// What went wrong.
    pub error: TransferError,
    /// Where it went wrong.
    pub stage: FailureStage,
}

/// Result of transferring one object.
#[derive(Debug)]
pub enum TransferOutcome {
    /// The object was transferred.
    Success(TransferSuccess),
    /// The object was not (fully) transferred.
    Failure(TransferFailure),
}

impl TransferOutcome {
    /// Build a failure outcome.
    #[must_use]
    pub fn failure(request: &TransferRequest, stage: FailureStage, error: TransferError) -> Self {
        Self::Failure(TransferFailure {
            request: request.clone(),
            error,
            stage,
        })
    }

    /// Whether this is a success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The success, if any.
    #[must_use]
    pub fn success(&self) -> Option<&TransferSuccess> {
        match self {
            Self::Success(s) => Some(s),
            Self::Failure(_) => None,
        }
    }

    /// The failure, if any.
    #[must_use]
    pub fn failure_ref(&self) -> Option<&TransferFailure> {
        match self {
            Self::Success(_) => None,
            Self::Failure(f) => Some(f),
        }
    }
}

/// Aggregated outcomes of a batch.
///
/// Every eligible request ends up in exactly one of the two collections.
#[derive(Debug, Default)]
pub struct BatchResult {
    successes: BTreeMap<TransferRequest, TransferSuccess>,
    failures: Vec<TransferFailure>,
}

impl BatchResult {
    /// Record the outcome of `request`.
    pub fn record(&mut self, request: TransferRequest, outcome: TransferOutcome) {
        match outcome {
            TransferOutcome::Success(success) => {
                self.successes.insert(request, success);
            }
            TransferOutcome::Failure(failure) => self.failures.push(failure),
        }
    }

    /// Move a successful request into the failure set at `stage`.
    ///
    /// Returns `false` and changes nothing if `request` is not currently a
    /// success.
    pub fn reclassify(
        &mut self,
        request: &TransferRequest,
        stage: FailureStage,
        error: TransferError,
    ) -> bool {
        match self.successes.remove_entry(request) {
            Some((request, _)) => {
                self.failures.push(TransferFailure {
                    request,
                    error,
                    stage,
                });
                true
            }
            None => false,
        }
    }

    /// Successful transfers keyed by request.
    #[must_use]
    pub fn successes(&self) -> &BTreeMap<TransferRequest, TransferSuccess> {
        &self.successes
    }

    /// Failed transfers in the order they were recorded.
    #[must_use]
    pub fn failures(&self) -> &[TransferFailure] {
        &self.failures
    }

    /// Number of successes.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    /// Number of failures.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Total recorded outcomes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.success_count() + self.failure_count()
    }

    /// Whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether every recorded outcome is a success.
    #[must_use]
    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Serializable summary.
    #[must_use]
    pub fn report(&self) -> BatchReport {
        BatchReport {
            succeeded: self.success_count(),
            failed: self.failure_count(),
            failures: self
                .failures
                .iter()
                .map(|f| FailureReport {
                    source: f.request.source.clone(),
                    destination: f.request.destination.clone(),
                    stage: f.stage,
                    message: f.error.to_string(),
                })
                .collect(),
        }
    }
}

/// Serializable summary of a [`BatchResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    /// Number of successes.
    pub succeeded: usize,
    /// Number of failures.
    pub failed: usize,
    /// One entry per failure.
    pub failures: Vec<FailureReport>,
}

/// One failure in a [`BatchReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureReport {
    /// Source object.
    pub source: ObjectLocation,
    /// Destination object.
    pub destination: ObjectLocation,
    /// Failed step.
    pub stage: FailureStage,
    /// Error message.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(key: &str) -> TransferRequest {
        TransferRequest::new(
            ObjectLocation::new("src", key),
            ObjectLocation::new("dst", key),
        )
    }

    fn success() -> TransferSuccess {
        TransferSuccess {
            version_id: None,
            etag: Some("\"e\"".to_owned()),
            size: 1,
            strategy: TransferStrategy::Single,
            source_version_id: None,
        }
    }

    #[test]
    fn test_should_reclassify_success_as_delete_failure() {
        let mut result = BatchResult::default();
        let req = request("a");
        result.record(req.clone(), TransferOutcome::Success(success()));

        let moved = result.reclassify(
            &req,
            FailureStage::Delete,
            TransferError::Config("x".to_owned()),
        );

        assert!(moved);
        assert_eq!(result.success_count(), 0);
        assert_eq!(result.failure_count(), 1);
        assert_eq!(result.failures()[0].stage, FailureStage::Delete);
    }

    #[test]
    fn test_should_not_reclassify_unknown_request() {
        let mut result = BatchResult::default();
        result.record(request("a"), TransferOutcome::Success(success()));

        let moved = result.reclassify(
            &request("b"),
            FailureStage::Delete,
            TransferError::Config("x".to_owned()),
        );

        assert!(!moved);
        assert_eq!(result.len(), 1);
        assert!(result.is_complete_success());
    }

    #[test]
    fn test_should_report_failures_with_stage() {
        let mut result = BatchResult::default();
        result.record(request("ok"), TransferOutcome::Success(success()));
        result.record(
            request("bad"),
            TransferOutcome::failure(
                &request("bad"),
                FailureStage::Metadata,
                TransferError::Config("boom".to_owned()),
            ),
        );

        let report = result.report();
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed, 1);
        let json = serde_json::to_string(&report).expect("test serialization");
        assert!(json.contains("\"stage\":\"METADATA\""));
        assert!(json.contains("boom"));
    }
}
