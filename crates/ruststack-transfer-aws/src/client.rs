//! `ObjectStoreClient` implementation over `aws-sdk-s3`.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_s3::primitives::DateTime as SdkDateTime;
use aws_sdk_s3::types::{
    CompletedMultipartUpload, CompletedPart as SdkCompletedPart, Delete, MetadataDirective,
    ObjectIdentifier as SdkObjectIdentifier, ObjectLockLegalHoldStatus, ObjectLockMode,
    StorageClass, TaggingDirective,
};
use chrono::DateTime;
use http::StatusCode;
use tracing::debug;

use ruststack_transfer_core::{ObjectStoreClient, StoreError};
use ruststack_transfer_model::ObjectLocation;
use ruststack_transfer_model::input::{
    AbortMultipartUploadInput, CompleteMultipartUploadInput, CopyObjectInput,
    CreateMultipartUploadInput, DeleteObjectInput, DeleteObjectsInput, ListObjectsInput,
    UploadPartCopyInput,
};
use ruststack_transfer_model::output::{
    AbortMultipartUploadOutput, CompleteMultipartUploadOutput, CopyObjectOutput,
    CreateMultipartUploadOutput, DeleteObjectError, DeleteObjectOutput, DeleteObjectsOutput,
    DeletedObject, ListObjectsOutput, ObjectMetadata, ObjectSummary, UploadPartCopyOutput,
};

use crate::error::classify_sdk_error;

/// Object store backed by an `aws_sdk_s3::Client`.
#[derive(Debug, Clone)]
pub struct AwsObjectStore {
    client: aws_sdk_s3::Client,
}

impl AwsObjectStore {
    /// Wrap an existing client.
    #[must_use]
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }

    /// The wrapped client.
    #[must_use]
    pub fn client(&self) -> &aws_sdk_s3::Client {
        &self.client
    }
}

fn internal(context: &str, err: impl std::fmt::Display) -> StoreError {
    StoreError::Internal(anyhow::anyhow!("{context}: {err}"))
}

fn part_number(n: u32) -> Result<i32, StoreError> {
    i32::try_from(n).map_err(|e| internal("part number out of range", e))
}

fn to_hash_map(map: &std::collections::BTreeMap<String, String>) -> HashMap<String, String> {
    map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
}

#[async_trait]
impl ObjectStoreClient for AwsObjectStore {
    async fn head_object(&self, location: &ObjectLocation) -> Result<ObjectMetadata, StoreError> {
        let output = self
            .client
            .head_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e, location))?;

        Ok(ObjectMetadata {
            size: output
                .content_length()
                .and_then(|n| u64::try_from(n).ok())
                .unwrap_or(0),
            version_id: output.version_id().map(ToOwned::to_owned),
            etag: output.e_tag().map(ToOwned::to_owned),
            content_type: output.content_type().map(ToOwned::to_owned),
            storage_class: output.storage_class().map(|c| c.as_str().to_owned()),
            metadata: output
                .metadata()
                .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
                .unwrap_or_default(),
        })
    }

    async fn copy_object(&self, input: &CopyObjectInput) -> Result<CopyObjectOutput, StoreError> {
        let attrs = &input.attributes;
        let mut request = self
            .client
            .copy_object()
            .copy_source(input.source.copy_source(input.source_version_id.as_deref()))
            .bucket(&input.destination.bucket)
            .key(&input.destination.key)
            .set_storage_class(attrs.storage_class.as_deref().map(StorageClass::from))
            .set_object_lock_mode(attrs.object_lock_mode.as_deref().map(ObjectLockMode::from))
            .set_object_lock_retain_until_date(
                attrs
                    .object_lock_retain_until
                    .map(|t| SdkDateTime::from_secs(t.timestamp())),
            )
            .set_object_lock_legal_hold_status(attrs.object_lock_legal_hold.map(|on| {
                if on {
                    ObjectLockLegalHoldStatus::On
                } else {
                    ObjectLockLegalHoldStatus::Off
                }
            }));

        if let Some(tagging) = attrs.tagging_header() {
            request = request
                .tagging(tagging)
                .tagging_directive(TaggingDirective::Replace);
        }
        if attrs.replaces_metadata() {
            request = request
                .metadata_directive(MetadataDirective::Replace)
                .set_metadata(attrs.metadata.as_ref().map(to_hash_map))
                .set_content_type(attrs.content_type.clone());
        }

        let output = request
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e, &input.source))?;

        debug!(
            source = %input.source,
            destination = %input.destination,
            "copy_object completed"
        );
        Ok(CopyObjectOutput {
            status: StatusCode::OK,
            version_id: output.version_id().map(ToOwned::to_owned),
            etag: output
                .copy_object_result()
                .and_then(|r| r.e_tag())
                .map(ToOwned::to_owned),
        })
    }

    async fn create_multipart_upload(
        &self,
        input: &CreateMultipartUploadInput,
    ) -> Result<CreateMultipartUploadOutput, StoreError> {
        let attrs = &input.attributes;
        let output = self
            .client
            .create_multipart_upload()
            .bucket(&input.destination.bucket)
            .key(&input.destination.key)
            .set_storage_class(attrs.storage_class.as_deref().map(StorageClass::from))
            .set_tagging(attrs.tagging_header())
            .set_metadata(attrs.metadata.as_ref().map(to_hash_map))
            .set_content_type(attrs.content_type.clone())
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e, &input.destination))?;

        let upload_id = output
            .upload_id()
            .ok_or_else(|| internal("create_multipart_upload", "response carried no upload id"))?;
        Ok(CreateMultipartUploadOutput {
            upload_id: upload_id.to_owned(),
        })
    }

    async fn upload_part_copy(
        &self,
        input: &UploadPartCopyInput,
    ) -> Result<UploadPartCopyOutput, StoreError> {
        let output = self
            .client
            .upload_part_copy()
            .bucket(&input.destination.bucket)
            .key(&input.destination.key)
            .upload_id(&input.upload_id)
            .part_number(part_number(input.part_number)?)
            .copy_source(input.source.copy_source(input.source_version_id.as_deref()))
            .copy_source_range(input.range.to_string())
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e, &input.source))?;

        let etag = output
            .copy_part_result()
            .and_then(|r| r.e_tag())
            .ok_or_else(|| internal("upload_part_copy", "response carried no etag"))?;
        Ok(UploadPartCopyOutput {
            part_number: input.part_number,
            etag: etag.to_owned(),
        })
    }

    async fn complete_multipart_upload(
        &self,
        input: &CompleteMultipartUploadInput,
    ) -> Result<CompleteMultipartUploadOutput, StoreError> {
        let parts = input
            .parts
            .iter()
            .map(|p| {
                Ok(SdkCompletedPart::builder()
                    .part_number(part_number(p.part_number)?)
                    .e_tag(&p.etag)
                    .build())
            })
            .collect::<Result<Vec<_>, StoreError>>()?;

        let output = self
            .client
            .complete_multipart_upload()
            .bucket(&input.destination.bucket)
            .key(&input.destination.key)
            .upload_id(&input.upload_id)
            .multipart_upload(
                CompletedMultipartUpload::builder()
                    .set_parts(Some(parts))
                    .build(),
            )
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e, &input.destination))?;

        Ok(CompleteMultipartUploadOutput {
            status: StatusCode::OK,
            etag: output.e_tag().map(ToOwned::to_owned),
            version_id: output.version_id().map(ToOwned::to_owned),
        })
    }

    async fn abort_multipart_upload(
        &self,
        input: &AbortMultipartUploadInput,
    ) -> Result<AbortMultipartUploadOutput, StoreError> {
        self.client
            .abort_multipart_upload()
            .bucket(&input.destination.bucket)
            .key(&input.destination.key)
            .upload_id(&input.upload_id)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e, &input.destination))?;

        Ok(AbortMultipartUploadOutput {
            status: StatusCode::NO_CONTENT,
        })
    }

    async fn delete_object(
        &self,
        input: &DeleteObjectInput,
    ) -> Result<DeleteObjectOutput, StoreError> {
        self.client
            .delete_object()
            .bucket(&input.location.bucket)
            .key(&input.location.key)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e, &input.location))?;

        Ok(DeleteObjectOutput {
            status: StatusCode::NO_CONTENT,
        })
    }

    async fn delete_objects(
        &self,
        input: &DeleteObjectsInput,
    ) -> Result<DeleteObjectsOutput, StoreError> {
        let objects = input
            .objects
            .iter()
            .map(|id| {
                SdkObjectIdentifier::builder()
                    .key(&id.key)
                    .set_version_id(id.version_id.clone())
                    .build()
                    .map_err(|e| internal("delete_objects", e))
            })
            .collect::<Result<Vec<_>, StoreError>>()?;
        let delete = Delete::builder()
            .set_objects(Some(objects))
            .quiet(false)
            .build()
            .map_err(|e| internal("delete_objects", e))?;

        let bucket = ObjectLocation::new(input.bucket.clone(), "");
        let output = self
            .client
            .delete_objects()
            .bucket(&input.bucket)
            .delete(delete)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e, &bucket))?;

        Ok(DeleteObjectsOutput {
            deleted: output
                .deleted()
                .iter()
                .map(|d| DeletedObject {
                    key: d.key().unwrap_or_default().to_owned(),
                    version_id: d.version_id().map(ToOwned::to_owned),
                })
                .collect(),
            errors: output
                .errors()
                .iter()
                .map(|e| DeleteObjectError {
                    key: e.key().unwrap_or_default().to_owned(),
                    version_id: e.version_id().map(ToOwned::to_owned),
                    code: e.code().unwrap_or("Unknown").to_owned(),
                    message: e.message().unwrap_or_default().to_owned(),
                })
                .collect(),
        })
    }

    async fn list_objects(&self, input: &ListObjectsInput) -> Result<ListObjectsOutput, StoreError> {
        let max_keys = input
            .max_keys
            .map(|n| i32::try_from(n).unwrap_or(i32::MAX));
        let output = self
            .client
            .list_objects_v2()
            .bucket(&input.bucket)
            .set_prefix(input.prefix.clone())
            .set_continuation_token(input.continuation_token.clone())
            .set_max_keys(max_keys)
            .send()
            .await
            .map_err(|e| {
                classify_sdk_error(
                    &e,
                    &ObjectLocation::new(input.bucket.clone(), input.prefix.clone().unwrap_or_default()),
                )
            })?;

        let objects = output
            .contents()
            .iter()
            .filter_map(|o| {
                Some(ObjectSummary {
                    key: o.key()?.to_owned(),
                    size: o.size().and_then(|n| u64::try_from(n).ok()).unwrap_or(0),
                    etag: o.e_tag().map(ToOwned::to_owned),
                    last_modified: o
                        .last_modified()
                        .and_then(|t| DateTime::from_timestamp(t.secs(), t.subsec_nanos())),
                })
            })
            .collect();

        Ok(ListObjectsOutput {
            objects,
            next_continuation_token: if output.is_truncated() == Some(true) {
                output.next_continuation_token().map(ToOwned::to_owned)
            } else {
                None
            },
        })
    }
}
