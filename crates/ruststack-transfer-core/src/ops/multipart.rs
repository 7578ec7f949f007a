//! Multipart copy engine.
//!
//! One object is copied as `Initiated -> PartsInFlight -> Completed`, or
//! `-> Aborted` when any part or the completion fails. Part copies are
//! issued all at once and may finish in any order; the completion request
//! always lists them by part number.

use std::collections::BTreeMap;

use futures::future::join_all;
use tracing::{debug, warn};

use ruststack_transfer_model::input::{
    AbortMultipartUploadInput, CompleteMultipartUploadInput, CreateMultipartUploadInput,
    UploadPartCopyInput,
};
use ruststack_transfer_model::output::{CopyObjectOutput, ObjectMetadata};
use ruststack_transfer_model::{ByteRange, CompletedPart, ObjectLocation, TransferRequest};

use crate::config::validate_part_size;
use crate::error::{CopyFailure, TransferError, TransferResult};
use crate::provider::S3Transfer;
use crate::strategy::MAX_PARTS;

/// Split `[0, object_size)` into consecutive inclusive ranges of
/// `part_size` bytes. The last range ends at `object_size - 1`.
///
/// An empty object yields no ranges.
///
/// # Examples
///
/// ```
/// use ruststack_transfer_core::part_ranges;
///
/// let mib = 1024 * 1024;
/// let ranges = part_ranges(12 * mib, 5 * mib).unwrap();
/// assert_eq!(ranges.len(), 3);
/// assert_eq!(ranges[2].start, 10 * mib);
/// assert_eq!(ranges[2].end, 12 * mib - 1);
/// ```
pub fn part_ranges(object_size: u64, part_size: u64) -> TransferResult<Vec<ByteRange>> {
    validate_part_size(part_size)?;

    let parts = object_size.div_ceil(part_size);
    if parts > MAX_PARTS {
        return Err(TransferError::TooManyParts {
            object_size,
            part_size,
            parts,
        });
    }

    Ok((0..parts)
        .map(|i| {
            let start = i * part_size;
            let end = (start + part_size).min(object_size) - 1;
            ByteRange::new(start, end)
        })
        .collect())
}

/// Lifecycle of a [`MultipartSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Upload id obtained, no part issued yet.
    Initiated,
    /// Part copies have been issued.
    PartsInFlight,
    /// The destination object was assembled.
    Completed,
    /// The session was torn down without an object.
    Aborted,
}

/// One multipart upload, owned by the transfer that created it.
#[derive(Debug)]
pub struct MultipartSession {
    upload_id: String,
    destination: ObjectLocation,
    parts: BTreeMap<u32, CompletedPart>,
    state: SessionState,
}

impl MultipartSession {
    /// A freshly initiated session.
    #[must_use]
    pub fn new(upload_id: impl Into<String>, destination: ObjectLocation) -> Self {
        Self {
            upload_id: upload_id.into(),
            destination,
            parts: BTreeMap::new(),
            state: SessionState::Initiated,
        }
    }

    /// Session id.
    #[must_use]
    pub fn upload_id(&self) -> &str {
        &self.upload_id
    }

    /// Destination object.
    #[must_use]
    pub fn destination(&self) -> &ObjectLocation {
        &self.destination
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Mark part copies as issued.
    pub fn start_parts(&mut self) {
        self.state = SessionState::PartsInFlight;
    }

    /// Record a finished part, replacing any earlier copy of the same number.
    pub fn record_part(&mut self, part: CompletedPart) {
        self.parts.insert(part.part_number, part);
    }

    /// Finished parts in part-number order.
    #[must_use]
    pub fn completed_parts(&self) -> Vec<CompletedPart> {
        self.parts.values().cloned().collect()
    }

    /// Number of finished parts.
    #[must_use]
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    fn complete(&mut self) {
        self.state = SessionState::Completed;
    }

    fn abort(&mut self) {
        self.state = SessionState::Aborted;
    }
}

impl S3Transfer {
    /// Copy `request.source` to `request.destination` in parts.
    ///
    /// Returns the copy result and the number of parts. The result carries
    /// `source.version_id`, not the version reported by the completion.
    pub(crate) async fn multipart_copy(
        &self,
        request: &TransferRequest,
        source: &ObjectMetadata,
        part_size: u64,
    ) -> TransferResult<(CopyObjectOutput, u32)> {
        let ranges = part_ranges(source.size, part_size)?;
        if ranges.is_empty() {
            return Err(copy_failed(request, CopyFailure::EmptySource));
        }

        let create = CreateMultipartUploadInput::from_request(request, source);
        let created = self
            .retry
            .run("create_multipart_upload", || {
                self.client.create_multipart_upload(&create)
            })
            .await
            .map_err(|e| copy_failed(request, e.into()))?;

        let mut session = MultipartSession::new(created.upload_id, request.destination.clone());
        debug!(
            upload_id = %session.upload_id(),
            destination = %request.destination,
            parts = ranges.len(),
            part_size,
            "multipart copy initiated"
        );

        let version = source.version_id.as_deref();
        let upload_id = session.upload_id().to_owned();
        session.start_parts();
        let results = join_all((1u32..).zip(ranges).map(|(part_number, range)| {
            let input = UploadPartCopyInput::for_part(request, version, &upload_id, part_number, range);
            async move {
                let result = self
                    .retry
                    .run("upload_part_copy", || self.client.upload_part_copy(&input))
                    .await;
                (part_number, result)
            }
        }))
        .await;

        for (part_number, result) in results {
            match result {
                Ok(output) => session.record_part(CompletedPart {
                    part_number,
                    etag: output.etag,
                }),
                Err(error) => {
                    self.abort_session(&mut session).await;
                    return Err(copy_failed(request, CopyFailure::Part { part_number, error }));
                }
            }
        }

        let complete = CompleteMultipartUploadInput::new(
            session.upload_id(),
            session.destination(),
            session.completed_parts(),
        );
        let completed = match self
            .retry
            .run("complete_multipart_upload", || {
                self.client.complete_multipart_upload(&complete)
            })
            .await
        {
            Ok(output) if output.status.is_success() => output,
            Ok(output) => {
                self.abort_session(&mut session).await;
                return Err(copy_failed(request, CopyFailure::Status(output.status)));
            }
            Err(e) => {
                self.abort_session(&mut session).await;
                return Err(copy_failed(request, e.into()));
            }
        };
        session.complete();

        let parts = u32::try_from(session.part_count()).unwrap_or(u32::MAX);
        debug!(
            upload_id = %session.upload_id(),
            destination = %request.destination,
            parts,
            "multipart copy completed"
        );
        Ok((
            CopyObjectOutput::from_completion(completed, source.version_id.clone()),
            parts,
        ))
    }

    /// Best-effort abort. A failure is logged and never returned.
    async fn abort_session(&self, session: &mut MultipartSession) {
        let input = AbortMultipartUploadInput {
            upload_id: session.upload_id().to_owned(),
            destination: session.destination().clone(),
        };
        let reason = match self
            .retry
            .run("abort_multipart_upload", || {
                self.client.abort_multipart_upload(&input)
            })
            .await
        {
            Ok(output) if output.status.is_success() => None,
            Ok(output) => Some(format!("store returned non-success status {}", output.status)),
            Err(e) => Some(e.to_string()),
        };
        session.abort();

        match reason {
            None => debug!(upload_id = %input.upload_id, "multipart upload aborted"),
            Some(reason) => {
                let err = TransferError::MultipartAbortFailed {
                    upload_id: input.upload_id,
                    destination: input.destination,
                    reason,
                };
                warn!(error = %err, "multipart abort failed, upload may be left behind");
            }
        }
    }
}

fn copy_failed(request: &TransferRequest, cause: CopyFailure) -> TransferError {
    TransferError::CopyFailed {
        destination: request.destination.clone(),
        cause,
    }
}
