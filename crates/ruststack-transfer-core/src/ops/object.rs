//! Single-object copy and move.

use tracing::debug;

use ruststack_transfer_model::input::{CopyObjectInput, DeleteObjectInput};
use ruststack_transfer_model::output::{CopyObjectOutput, ObjectMetadata};
use ruststack_transfer_model::{ObjectLocation, TransferRequest};

use crate::config::CopyConfig;
use crate::error::{CopyFailure, DeleteFailure, TransferError, TransferResult};
use crate::outcome::{FailureStage, TransferOutcome, TransferStrategy, TransferSuccess};
use crate::provider::S3Transfer;
use crate::strategy::TransferPolicy;

impl S3Transfer {
    /// Copy one object using the part size and policy of `config`.
    pub async fn copy_object(&self, request: &TransferRequest, config: &CopyConfig) -> TransferOutcome {
        self.transfer_object(request, config.part_size, false, &config.policy)
            .await
    }

    /// Copy one object, then delete its source.
    pub async fn move_object(&self, request: &TransferRequest, config: &CopyConfig) -> TransferOutcome {
        self.transfer_object(request, config.part_size, true, &config.policy)
            .await
    }

    /// Transfer one object.
    ///
    /// 1. A request whose source and destination are the same object fails
    ///    with [`TransferError::SourceDestinationSame`] and issues no call.
    /// 2. Source metadata is fetched; a failure is a `Metadata` stage failure.
    /// 3. `policy` picks a single copy or a multipart copy.
    /// 4. A copy answered with a non-success status is a `Copy` failure.
    /// 5. With `delete_source`, the source is deleted after a successful copy.
    ///    A failed delete is a `Delete` failure and the destination stays.
    pub async fn transfer_object(
        &self,
        request: &TransferRequest,
        part_size: u64,
        delete_source: bool,
        policy: &TransferPolicy,
    ) -> TransferOutcome {
        if request.is_source_destination_same() {
            return TransferOutcome::failure(
                request,
                FailureStage::Copy,
                TransferError::SourceDestinationSame {
                    location: request.source.clone(),
                },
            );
        }

        let source = match self.fetch_metadata(&request.source).await {
            Ok(source) => source,
            Err(e) => return TransferOutcome::failure(request, FailureStage::Metadata, e),
        };

        let copied = if policy.should_use_multipart(source.size, part_size) {
            self.multipart_copy(request, &source, part_size)
                .await
                .map(|(output, parts)| (output, TransferStrategy::Multipart { parts }))
        } else {
            self.single_copy(request, &source)
                .await
                .map(|output| (output, TransferStrategy::Single))
        };
        let (output, strategy) = match copied {
            Ok(copied) => copied,
            Err(e) => return TransferOutcome::failure(request, FailureStage::Copy, e),
        };

        if delete_source {
            if let Err(e) = self.delete_source(&request.source).await {
                return TransferOutcome::failure(request, FailureStage::Delete, e);
            }
        }

        debug!(
            source = %request.source,
            destination = %request.destination,
            size = source.size,
            strategy = ?strategy,
            moved = delete_source,
            "transfer_object completed"
        );

        TransferOutcome::Success(TransferSuccess {
            version_id: output.version_id,
            etag: output.etag,
            size: source.size,
            strategy,
            source_version_id: source.version_id,
        })
    }

    async fn fetch_metadata(&self, location: &ObjectLocation) -> TransferResult<ObjectMetadata> {
        self.retry
            .run("head_object", || self.client.head_object(location))
            .await
            .map_err(|source| TransferError::MetadataFetchFailed {
                location: location.clone(),
                source,
            })
    }

    /// One `CopyObject` pinned to the fetched source version.
    async fn single_copy(
        &self,
        request: &TransferRequest,
        source: &ObjectMetadata,
    ) -> TransferResult<CopyObjectOutput> {
        let input = CopyObjectInput::from_request(request, source.version_id.as_deref())
            .inheriting(source);
        let output = self
            .retry
            .run("copy_object", || self.client.copy_object(&input))
            .await
            .map_err(|e| TransferError::CopyFailed {
                destination: request.destination.clone(),
                cause: CopyFailure::Store(e),
            })?;

        if output.status.is_success() {
            Ok(output)
        } else {
            Err(TransferError::CopyFailed {
                destination: request.destination.clone(),
                cause: CopyFailure::Status(output.status),
            })
        }
    }

    /// Delete one source object.
    pub(crate) async fn delete_source(&self, location: &ObjectLocation) -> TransferResult<()> {
        let input = DeleteObjectInput {
            location: location.clone(),
        };
        let cause = match self
            .retry
            .run("delete_object", || self.client.delete_object(&input))
            .await
        {
            Ok(output) if output.status.is_success() => return Ok(()),
            Ok(output) => DeleteFailure::Status(output.status),
            Err(e) => DeleteFailure::Store(e),
        };
        Err(TransferError::DeleteFailed {
            location: location.clone(),
            cause,
        })
    }
}
