//! Source deletion after a batched move.
//!
//! Sources of successful copies are grouped by bucket and removed with bulk
//! deletes of at most [`MAX_DELETE_BATCH`] keys, each entry pinned to the
//! version that was copied. Groups run one after another. Any key the store
//! refuses to delete, and every key of a bulk call that fails outright, is
//! moved from the success set into the failure set at the `Delete` stage.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use ruststack_transfer_model::input::DeleteObjectsInput;
use ruststack_transfer_model::{ObjectIdentifier, TransferRequest};

use crate::error::{DeleteFailure, TransferError};
use crate::outcome::{BatchResult, FailureStage};
use crate::provider::S3Transfer;

/// Most keys one bulk delete may carry.
pub const MAX_DELETE_BATCH: usize = 1000;

/// A successfully copied request and the source version it copied.
type DeleteEntry = (TransferRequest, Option<String>);

impl S3Transfer {
    /// Delete the sources of every success in `result`, reclassifying
    /// failed deletes.
    pub(crate) async fn reconcile_deletes(&self, result: &mut BatchResult) {
        let mut by_bucket: BTreeMap<String, Vec<DeleteEntry>> = BTreeMap::new();
        for (request, success) in result.successes() {
            if request.is_source_destination_same() {
                continue;
            }
            by_bucket
                .entry(request.source.bucket.clone())
                .or_default()
                .push((request.clone(), success.source_version_id.clone()));
        }

        for (bucket, entries) in &by_bucket {
            for chunk in entries.chunks(MAX_DELETE_BATCH) {
                self.delete_group(bucket, chunk, result).await;
            }
        }

        info!(
            buckets = by_bucket.len(),
            failed = result.failure_count(),
            "batched source deletion finished"
        );
    }

    async fn delete_group(&self, bucket: &str, chunk: &[DeleteEntry], result: &mut BatchResult) {
        let input = DeleteObjectsInput {
            bucket: bucket.to_owned(),
            objects: chunk
                .iter()
                .map(|(request, version_id)| ObjectIdentifier {
                    key: request.source.key.clone(),
                    version_id: version_id.clone(),
                })
                .collect(),
        };

        match self
            .retry
            .run("delete_objects", || self.client.delete_objects(&input))
            .await
        {
            Ok(output) => {
                debug!(
                    bucket,
                    deleted = output.deleted.len(),
                    errors = output.errors.len(),
                    "delete_objects completed"
                );
                for error in &output.errors {
                    warn!(
                        bucket,
                        key = %error.key,
                        code = %error.code,
                        message = %error.message,
                        "store refused to delete source"
                    );
                    for (request, _) in chunk.iter().filter(|(r, _)| r.source.key == error.key) {
                        result.reclassify(
                            request,
                            FailureStage::Delete,
                            TransferError::DeleteFailed {
                                location: request.source.clone(),
                                cause: DeleteFailure::Rejected {
                                    code: error.code.clone(),
                                    message: error.message.clone(),
                                },
                            },
                        );
                    }
                }
            }
            Err(err) => {
                warn!(bucket, keys = chunk.len(), error = %err, "delete_objects failed");
                let reason = err.to_string();
                for (request, _) in chunk {
                    result.reclassify(
                        request,
                        FailureStage::Delete,
                        TransferError::DeleteFailed {
                            location: request.source.clone(),
                            cause: DeleteFailure::BulkCallFailed(reason.clone()),
                        },
                    );
                }
            }
        }
    }
}
