//! The object store seam.
//!
//! [`ObjectStoreClient`] is everything the transfer engine needs from an
//! object store. Implementations return a [`StoreError`] for calls that
//! failed outright; calls that completed with a non-success status return
//! `Ok` with that status, and the engine decides what it means.
//!
//! # Object safety
//!
//! The trait uses `#[async_trait]` so it can be held as
//! `Arc<dyn ObjectStoreClient>` and shared across concurrent transfers.

use std::fmt;

use async_trait::async_trait;
use ruststack_transfer_model::ObjectLocation;
use ruststack_transfer_model::input::{
    AbortMultipartUploadInput, CompleteMultipartUploadInput, CopyObjectInput,
    CreateMultipartUploadInput, DeleteObjectInput, DeleteObjectsInput, ListObjectsInput,
    UploadPartCopyInput,
};
use ruststack_transfer_model::output::{
    AbortMultipartUploadOutput, CompleteMultipartUploadOutput, CopyObjectOutput,
    CreateMultipartUploadOutput, DeleteObjectOutput, DeleteObjectsOutput, ListObjectsOutput,
    ObjectMetadata, UploadPartCopyOutput,
};

use crate::error::StoreError;

/// Operations the transfer engine issues against an object store.
#[async_trait]
pub trait ObjectStoreClient: fmt::Debug + Send + Sync {
    /// Fetch size, version and attributes of an object.
    async fn head_object(&self, location: &ObjectLocation) -> Result<ObjectMetadata, StoreError>;

    /// Server-side copy in one call.
    async fn copy_object(&self, input: &CopyObjectInput) -> Result<CopyObjectOutput, StoreError>;

    /// Start a multipart session on the destination.
    async fn create_multipart_upload(
        &self,
        input: &CreateMultipartUploadInput,
    ) -> Result<CreateMultipartUploadOutput, StoreError>;

    /// Copy one byte range of the source as a part.
    async fn upload_part_copy(
        &self,
        input: &UploadPartCopyInput,
    ) -> Result<UploadPartCopyOutput, StoreError>;

    /// Assemble the listed parts into the destination object.
    async fn complete_multipart_upload(
        &self,
        input: &CompleteMultipartUploadInput,
    ) -> Result<CompleteMultipartUploadOutput, StoreError>;

    /// Discard a multipart session and its parts.
    async fn abort_multipart_upload(
        &self,
        input: &AbortMultipartUploadInput,
    ) -> Result<AbortMultipartUploadOutput, StoreError>;

    /// Delete one object.
    async fn delete_object(&self, input: &DeleteObjectInput)
    -> Result<DeleteObjectOutput, StoreError>;

    /// Delete up to 1000 objects in one bucket, reporting per-key results.
    async fn delete_objects(
        &self,
        input: &DeleteObjectsInput,
    ) -> Result<DeleteObjectsOutput, StoreError>;

    /// Fetch one page of a listing.
    async fn list_objects(&self, input: &ListObjectsInput) -> Result<ListObjectsOutput, StoreError>;
}
