//! In-memory object store.
//!
//! [`InMemoryObjectStore`] implements [`ObjectStoreClient`] over process
//! memory. Objects are tracked by size and attributes only; no payload bytes
//! are held, so multi-gigabyte objects cost nothing to simulate.
//!
//! Beyond plain storage it can inject faults through a [`FaultPlan`], counts
//! every call by operation name, and records the peak number of copy calls
//! (single copies plus part copies) in flight at once.
//!
//! Interior mutability follows the usual split: the object table sits behind
//! a `parking_lot::RwLock` (ordered, for listing) and pending multipart
//! uploads live in a `DashMap`.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use http::StatusCode;
use parking_lot::{Mutex, MutexGuard, RwLock};
use tracing::debug;

use ruststack_transfer_model::input::{
    AbortMultipartUploadInput, CompleteMultipartUploadInput, CopyObjectInput,
    CreateMultipartUploadInput, DeleteObjectInput, DeleteObjectsInput, ListObjectsInput,
    ObjectAttributes, UploadPartCopyInput,
};
use ruststack_transfer_model::output::{
    AbortMultipartUploadOutput, CompleteMultipartUploadOutput, CopyObjectOutput,
    CreateMultipartUploadOutput, DeleteObjectError, DeleteObjectOutput, DeleteObjectsOutput,
    DeletedObject, ListObjectsOutput, ObjectMetadata, ObjectSummary, UploadPartCopyOutput,
};
use ruststack_transfer_model::ObjectLocation;

use crate::checksums::{compute_etag, compute_multipart_etag};
use crate::client::ObjectStoreClient;
use crate::error::StoreError;

/// Operation names used for call counting and cancellation injection.
pub mod op {
    /// `HeadObject`.
    pub const HEAD_OBJECT: &str = "head_object";
    /// `CopyObject`.
    pub const COPY_OBJECT: &str = "copy_object";
    /// `CreateMultipartUpload`.
    pub const CREATE_MULTIPART_UPLOAD: &str = "create_multipart_upload";
    /// `UploadPartCopy`.
    pub const UPLOAD_PART_COPY: &str = "upload_part_copy";
    /// `CompleteMultipartUpload`.
    pub const COMPLETE_MULTIPART_UPLOAD: &str = "complete_multipart_upload";
    /// `AbortMultipartUpload`.
    pub const ABORT_MULTIPART_UPLOAD: &str = "abort_multipart_upload";
    /// `DeleteObject`.
    pub const DELETE_OBJECT: &str = "delete_object";
    /// `DeleteObjects`.
    pub const DELETE_OBJECTS: &str = "delete_objects";
    /// `ListObjectsV2`.
    pub const LIST_OBJECTS: &str = "list_objects";
}

/// Maximum keys accepted by one bulk delete.
const MAX_BULK_DELETE_KEYS: usize = 1000;

/// Default listing page size.
const DEFAULT_MAX_KEYS: u32 = 1000;

/// Scheduler yields taken inside each copy call so concurrent copies overlap.
const COPY_YIELDS: usize = 4;

/// Faults to inject. Every field is empty by default.
#[derive(Debug, Default)]
pub struct FaultPlan {
    /// Destinations whose single copy answers with this status and writes
    /// nothing.
    pub copy_status: HashMap<ObjectLocation, StatusCode>,
    /// Part numbers whose `UploadPartCopy` fails with `InternalError`.
    pub failing_parts: HashSet<u32>,
    /// Extra scheduler yields taken by the `UploadPartCopy` of a part
    /// number, to make parts finish out of order.
    pub part_yields: HashMap<u32, usize>,
    /// Status answered by every `CompleteMultipartUpload`, leaving the
    /// session pending.
    pub complete_status: Option<StatusCode>,
    /// Make every `AbortMultipartUpload` fail.
    pub fail_abort: bool,
    /// Sources whose single delete answers with this status and deletes
    /// nothing.
    pub delete_status: HashMap<ObjectLocation, StatusCode>,
    /// Sources whose single delete fails with `AccessDenied`.
    pub failing_deletes: HashSet<ObjectLocation>,
    /// Keys that bulk deletes report as `AccessDenied`.
    pub rejected_bulk_deletes: HashSet<ObjectLocation>,
    /// Make every `DeleteObjects` call fail as a whole.
    pub fail_bulk_delete: bool,
    /// Number of leading calls per operation that fail with
    /// [`StoreError::Cancelled`].
    pub cancellations: HashMap<&'static str, u32>,
}

#[derive(Debug, Clone)]
struct StoredObject {
    size: u64,
    version_id: Option<String>,
    etag: String,
    content_type: Option<String>,
    storage_class: Option<String>,
    metadata: BTreeMap<String, String>,
    tags: BTreeMap<String, String>,
}

impl StoredObject {
    fn to_metadata(&self) -> ObjectMetadata {
        ObjectMetadata {
            size: self.size,
            version_id: self.version_id.clone(),
            etag: Some(self.etag.clone()),
            content_type: self.content_type.clone(),
            storage_class: self.storage_class.clone(),
            metadata: self.metadata.clone(),
        }
    }

    /// Apply overrides; unset fields keep the current value.
    fn apply(&mut self, attributes: &ObjectAttributes) {
        if let Some(class) = &attributes.storage_class {
            self.storage_class = Some(class.clone());
        }
        if let Some(tags) = &attributes.tags {
            self.tags.clone_from(tags);
        }
        if let Some(metadata) = &attributes.metadata {
            self.metadata.clone_from(metadata);
        }
        if let Some(content_type) = &attributes.content_type {
            self.content_type = Some(content_type.clone());
        }
    }
}

#[derive(Debug)]
struct PendingUpload {
    destination: ObjectLocation,
    attributes: ObjectAttributes,
    parts: BTreeMap<u32, StoredPart>,
}

#[derive(Debug, Clone)]
struct StoredPart {
    size: u64,
    etag: String,
}

/// Decrements the in-flight counter when a copy call finishes or is dropped.
struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Object store held entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    objects: RwLock<BTreeMap<ObjectLocation, StoredObject>>,
    uploads: DashMap<String, PendingUpload>,
    faults: Mutex<FaultPlan>,
    calls: DashMap<&'static str, u64>,
    copies_in_flight: AtomicUsize,
    peak_copies_in_flight: AtomicUsize,
    part_finish_order: Mutex<Vec<u32>>,
    versioning: AtomicBool,
    next_version: AtomicU64,
}

impl InMemoryObjectStore {
    /// Create an empty, unversioned store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that assigns a version id to every write.
    #[must_use]
    pub fn versioned() -> Self {
        let store = Self::default();
        store.versioning.store(true, Ordering::SeqCst);
        store
    }

    /// Insert an object of `size` bytes and return its metadata.
    pub fn put_object(&self, bucket: &str, key: &str, size: u64) -> ObjectMetadata {
        self.put_object_with(ObjectLocation::new(bucket, key), size, ObjectAttributes::default())
    }

    /// Insert an object with explicit attributes and return its metadata.
    pub fn put_object_with(
        &self,
        location: ObjectLocation,
        size: u64,
        attributes: ObjectAttributes,
    ) -> ObjectMetadata {
        let version_id = self.new_version_id();
        let mut object = StoredObject {
            size,
            etag: compute_etag(format!("{location}:{size}:{version_id:?}").as_bytes()),
            version_id,
            content_type: None,
            storage_class: None,
            metadata: BTreeMap::new(),
            tags: BTreeMap::new(),
        };
        object.apply(&attributes);
        let metadata = object.to_metadata();
        self.objects.write().insert(location, object);
        metadata
    }

    /// Whether an object exists at `location`.
    #[must_use]
    pub fn contains(&self, location: &ObjectLocation) -> bool {
        self.objects.read().contains_key(location)
    }

    /// Metadata of the object at `location`.
    #[must_use]
    pub fn object(&self, location: &ObjectLocation) -> Option<ObjectMetadata> {
        self.objects.read().get(location).map(StoredObject::to_metadata)
    }

    /// Tags of the object at `location`.
    #[must_use]
    pub fn object_tags(&self, location: &ObjectLocation) -> Option<BTreeMap<String, String>> {
        self.objects.read().get(location).map(|o| o.tags.clone())
    }

    /// Number of stored objects.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.read().len()
    }

    /// Number of multipart sessions neither completed nor aborted.
    #[must_use]
    pub fn pending_uploads(&self) -> usize {
        self.uploads.len()
    }

    /// Calls made to operation `name` (see [`op`]), including failed ones.
    #[must_use]
    pub fn calls(&self, name: &str) -> u64 {
        self.calls.get(name).map_or(0, |c| *c)
    }

    /// Calls made across every operation.
    #[must_use]
    pub fn total_calls(&self) -> u64 {
        self.calls.iter().map(|c| *c.value()).sum()
    }

    /// Highest number of copy calls observed in flight at the same time.
    #[must_use]
    pub fn peak_concurrent_copies(&self) -> usize {
        self.peak_copies_in_flight.load(Ordering::SeqCst)
    }

    /// Lock the fault plan for inspection or modification.
    pub fn faults(&self) -> MutexGuard<'_, FaultPlan> {
        self.faults.lock()
    }

    /// Part numbers in the order their copies were stored.
    #[must_use]
    pub fn part_finish_order(&self) -> Vec<u32> {
        self.part_finish_order.lock().clone()
    }

    fn new_version_id(&self) -> Option<String> {
        self.versioning.load(Ordering::SeqCst).then(|| {
            let n = self.next_version.fetch_add(1, Ordering::SeqCst);
            format!("v{n:08}-{}", uuid::Uuid::new_v4().simple())
        })
    }

    /// Count the call and consume one injected cancellation, if any.
    fn enter(&self, name: &'static str) -> Result<(), StoreError> {
        *self.calls.entry(name).or_insert(0) += 1;
        let mut faults = self.faults.lock();
        if let Some(remaining) = faults.cancellations.get_mut(name) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(StoreError::Cancelled(format!("{name}: connection reset")));
            }
        }
        Ok(())
    }

    async fn copy_in_flight(&self) -> InFlightGuard<'_> {
        let now = self.copies_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_copies_in_flight.fetch_max(now, Ordering::SeqCst);
        let guard = InFlightGuard(&self.copies_in_flight);
        for _ in 0..COPY_YIELDS {
            tokio::task::yield_now().await;
        }
        guard
    }

    /// Resolve a pinned source version against the current object.
    fn source_object(
        &self,
        source: &ObjectLocation,
        version_id: Option<&str>,
    ) -> Result<StoredObject, StoreError> {
        let objects = self.objects.read();
        let object = objects.get(source).ok_or_else(|| not_found(source))?;
        match (version_id, object.version_id.as_deref()) {
            (Some(wanted), current) if current != Some(wanted) => Err(StoreError::service(
                "NoSuchVersion",
                format!("version {wanted} of {source} does not exist"),
            )),
            _ => Ok(object.clone()),
        }
    }
}

fn not_found(location: &ObjectLocation) -> StoreError {
    StoreError::NotFound {
        bucket: location.bucket.clone(),
        key: location.key.clone(),
    }
}

fn no_such_upload(upload_id: &str) -> StoreError {
    StoreError::service(
        "NoSuchUpload",
        format!("The specified upload does not exist: {upload_id}"),
    )
}

#[async_trait]
impl ObjectStoreClient for InMemoryObjectStore {
    async fn head_object(&self, location: &ObjectLocation) -> Result<ObjectMetadata, StoreError> {
        self.enter(op::HEAD_OBJECT)?;
        self.object(location).ok_or_else(|| not_found(location))
    }

    async fn copy_object(&self, input: &CopyObjectInput) -> Result<CopyObjectOutput, StoreError> {
        self.enter(op::COPY_OBJECT)?;
        let _guard = self.copy_in_flight().await;

        if let Some(status) = self.faults.lock().copy_status.get(&input.destination) {
            return Ok(CopyObjectOutput {
                status: *status,
                version_id: None,
                etag: None,
            });
        }

        let mut object = self.source_object(&input.source, input.source_version_id.as_deref())?;
        object.apply(&input.attributes);
        object.version_id = self.new_version_id();
        let output = CopyObjectOutput {
            status: StatusCode::OK,
            version_id: object.version_id.clone(),
            etag: Some(object.etag.clone()),
        };
        self.objects.write().insert(input.destination.clone(), object);

        debug!(source = %input.source, destination = %input.destination, "memory copy_object");
        Ok(output)
    }

    async fn create_multipart_upload(
        &self,
        input: &CreateMultipartUploadInput,
    ) -> Result<CreateMultipartUploadOutput, StoreError> {
        self.enter(op::CREATE_MULTIPART_UPLOAD)?;
        let upload_id = uuid::Uuid::new_v4().to_string();
        self.uploads.insert(
            upload_id.clone(),
            PendingUpload {
                destination: input.destination.clone(),
                attributes: input.attributes.clone(),
                parts: BTreeMap::new(),
            },
        );
        Ok(CreateMultipartUploadOutput { upload_id })
    }

    async fn upload_part_copy(
        &self,
        input: &UploadPartCopyInput,
    ) -> Result<UploadPartCopyOutput, StoreError> {
        self.enter(op::UPLOAD_PART_COPY)?;
        let _guard = self.copy_in_flight().await;

        let extra_yields = {
            let faults = self.faults.lock();
            if faults.failing_parts.contains(&input.part_number) {
                return Err(StoreError::service(
                    "InternalError",
                    format!("part {} could not be copied", input.part_number),
                ));
            }
            faults.part_yields.get(&input.part_number).copied().unwrap_or(0)
        };
        for _ in 0..extra_yields {
            tokio::task::yield_now().await;
        }

        let source = self.source_object(&input.source, input.source_version_id.as_deref())?;
        if input.range.end >= source.size {
            return Err(StoreError::service(
                "InvalidRange",
                format!("{} is outside an object of {} bytes", input.range, source.size),
            ));
        }

        let etag = compute_etag(
            format!("{}:{}:{}", input.source, source.etag, input.range).as_bytes(),
        );
        let mut upload = self
            .uploads
            .get_mut(&input.upload_id)
            .ok_or_else(|| no_such_upload(&input.upload_id))?;
        upload.parts.insert(
            input.part_number,
            StoredPart {
                size: input.range.len(),
                etag: etag.clone(),
            },
        );
        drop(upload);
        self.part_finish_order.lock().push(input.part_number);

        Ok(UploadPartCopyOutput {
            part_number: input.part_number,
            etag,
        })
    }

    async fn complete_multipart_upload(
        &self,
        input: &CompleteMultipartUploadInput,
    ) -> Result<CompleteMultipartUploadOutput, StoreError> {
        self.enter(op::COMPLETE_MULTIPART_UPLOAD)?;

        if !self.uploads.contains_key(&input.upload_id) {
            return Err(no_such_upload(&input.upload_id));
        }
        if let Some(status) = self.faults.lock().complete_status {
            return Ok(CompleteMultipartUploadOutput {
                status,
                etag: None,
                version_id: None,
            });
        }

        if input.parts.is_empty() {
            return Err(StoreError::service(
                "MalformedXML",
                "a multipart upload needs at least one part",
            ));
        }
        if input
            .parts
            .windows(2)
            .any(|w| w[0].part_number >= w[1].part_number)
        {
            return Err(StoreError::service(
                "InvalidPartOrder",
                "parts must be listed in ascending order",
            ));
        }

        let (_, upload) = self
            .uploads
            .remove(&input.upload_id)
            .ok_or_else(|| no_such_upload(&input.upload_id))?;

        let mut size = 0;
        for part in &input.parts {
            match upload.parts.get(&part.part_number) {
                Some(stored) if stored.etag == part.etag => size += stored.size,
                _ => {
                    return Err(StoreError::service(
                        "InvalidPart",
                        format!("part {} was not uploaded", part.part_number),
                    ));
                }
            }
        }

        let etags: Vec<&str> = input.parts.iter().map(|p| p.etag.as_str()).collect();
        let mut object = StoredObject {
            size,
            version_id: self.new_version_id(),
            etag: compute_multipart_etag(&etags),
            content_type: None,
            storage_class: None,
            metadata: BTreeMap::new(),
            tags: BTreeMap::new(),
        };
        object.apply(&upload.attributes);
        let output = CompleteMultipartUploadOutput {
            status: StatusCode::OK,
            etag: Some(object.etag.clone()),
            version_id: object.version_id.clone(),
        };
        self.objects.write().insert(upload.destination, object);
        Ok(output)
    }

    async fn abort_multipart_upload(
        &self,
        input: &AbortMultipartUploadInput,
    ) -> Result<AbortMultipartUploadOutput, StoreError> {
        self.enter(op::ABORT_MULTIPART_UPLOAD)?;
        if self.faults.lock().fail_abort {
            return Err(StoreError::service("InternalError", "abort failed"));
        }
        self.uploads
            .remove(&input.upload_id)
            .ok_or_else(|| no_such_upload(&input.upload_id))?;
        Ok(AbortMultipartUploadOutput {
            status: StatusCode::NO_CONTENT,
        })
    }

    async fn delete_object(
        &self,
        input: &DeleteObjectInput,
    ) -> Result<DeleteObjectOutput, StoreError> {
        self.enter(op::DELETE_OBJECT)?;
        {
            let faults = self.faults.lock();
            if let Some(status) = faults.delete_status.get(&input.location) {
                return Ok(DeleteObjectOutput { status: *status });
            }
            if faults.failing_deletes.contains(&input.location) {
                return Err(StoreError::service("AccessDenied", "Access Denied"));
            }
        }
        self.objects.write().remove(&input.location);
        Ok(DeleteObjectOutput {
            status: StatusCode::NO_CONTENT,
        })
    }

    async fn delete_objects(
        &self,
        input: &DeleteObjectsInput,
    ) -> Result<DeleteObjectsOutput, StoreError> {
        self.enter(op::DELETE_OBJECTS)?;
        if input.objects.len() > MAX_BULK_DELETE_KEYS {
            return Err(StoreError::service(
                "MalformedXML",
                format!(
                    "at most {MAX_BULK_DELETE_KEYS} keys per request, got {}",
                    input.objects.len()
                ),
            ));
        }

        let faults = self.faults.lock();
        if faults.fail_bulk_delete {
            return Err(StoreError::service("InternalError", "bulk delete failed"));
        }

        let mut output = DeleteObjectsOutput::default();
        let mut objects = self.objects.write();
        for id in &input.objects {
            let location = ObjectLocation::new(input.bucket.clone(), id.key.clone());
            if faults.rejected_bulk_deletes.contains(&location) {
                output.errors.push(DeleteObjectError {
                    key: id.key.clone(),
                    version_id: id.version_id.clone(),
                    code: "AccessDenied".to_owned(),
                    message: "Access Denied".to_owned(),
                });
            } else {
                objects.remove(&location);
                output.deleted.push(DeletedObject {
                    key: id.key.clone(),
                    version_id: id.version_id.clone(),
                });
            }
        }
        Ok(output)
    }

    async fn list_objects(&self, input: &ListObjectsInput) -> Result<ListObjectsOutput, StoreError> {
        self.enter(op::LIST_OBJECTS)?;
        let max_keys = input.max_keys.unwrap_or(DEFAULT_MAX_KEYS).max(1) as usize;
        let prefix = input.prefix.as_deref().unwrap_or("");
        let after = input.continuation_token.as_deref();

        let objects = self.objects.read();
        let mut matching = objects
            .iter()
            .filter(|(loc, _)| loc.bucket == input.bucket && loc.key.starts_with(prefix))
            .filter(|(loc, _)| after.is_none_or(|token| loc.key.as_str() > token))
            .map(|(loc, obj)| ObjectSummary {
                key: loc.key.clone(),
                size: obj.size,
                etag: Some(obj.etag.clone()),
                last_modified: None,
            });

        let page: Vec<ObjectSummary> = matching.by_ref().take(max_keys).collect();
        let next_continuation_token = if matching.next().is_some() {
            page.last().map(|o| o.key.clone())
        } else {
            None
        };

        Ok(ListObjectsOutput {
            objects: page,
            next_continuation_token,
        })
    }
}
