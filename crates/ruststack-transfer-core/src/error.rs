//! Transfer error types.
//!
//! Two layers of errors exist:
//!
//! - [`StoreError`] is what an [`ObjectStoreClient`](crate::ObjectStoreClient)
//!   returns for a single remote call. Only its `Cancelled` and `Transient`
//!   variants are ever retried.
//! - [`TransferError`] is what a transfer reports. Per-object failures carry
//!   one inside a [`TransferFailure`](crate::TransferFailure); config-level
//!   failures (`InvalidPartSize`, `Config`) are returned directly from the
//!   batch entry points before any remote call is made.
//!
//! # Usage
//!
//! ```
//! use ruststack_transfer_core::error::{StoreError, TransferError};
//!
//! assert!(StoreError::Cancelled("socket closed".to_owned()).is_retryable());
//! assert!(!StoreError::NotFound { bucket: "b".to_owned(), key: "k".to_owned() }.is_retryable());
//!
//! let err = TransferError::InvalidPartSize { part_size: 1024 };
//! assert!(err.to_string().contains("1024"));
//! ```

use http::StatusCode;
use ruststack_transfer_model::ObjectLocation;

/// Failure of one remote call to the object store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The addressed object does not exist.
    #[error("The specified key does not exist: {bucket}/{key}")]
    NotFound {
        /// Bucket that was queried.
        bucket: String,
        /// Key that was not found.
        key: String,
    },

    /// The call was cancelled before completing (connection reset, timeout,
    /// dropped future).
    #[error("operation cancelled: {0}")]
    Cancelled(String),

    /// A transient condition such as throttling or a 5xx response.
    #[error("transient failure: {0}")]
    Transient(String),

    /// The store rejected the call with an error code.
    #[error("{code}: {message}")]
    Service {
        /// Store error code (e.g. `AccessDenied`).
        code: String,
        /// Message from the store.
        message: String,
    },

    /// Internal error with context.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl StoreError {
    /// Default retry predicate: only cancellations and transient conditions.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Cancelled(_) | Self::Transient(_))
    }

    /// Shorthand for a [`StoreError::Service`].
    #[must_use]
    pub fn service(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Service {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Why a copy failed.
#[derive(Debug, thiserror::Error)]
pub enum CopyFailure {
    /// The store answered with a non-success status and no error.
    #[error("store returned non-success status {0}")]
    Status(StatusCode),

    /// A remote call failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// One part of a multipart copy failed.
    #[error("part {part_number} failed: {error}")]
    Part {
        /// Failed part number.
        part_number: u32,
        /// Underlying error.
        #[source]
        error: StoreError,
    },

    /// Multipart copy of a zero-length object was requested.
    #[error("cannot multipart-copy an empty object")]
    EmptySource,
}

/// Why deleting a source object failed.
#[derive(Debug, thiserror::Error)]
pub enum DeleteFailure {
    /// The store answered with a non-success status and no error.
    #[error("store returned non-success status {0}")]
    Status(StatusCode),

    /// The delete call failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A bulk delete reported this key as not deleted.
    #[error("{code}: {message}")]
    Rejected {
        /// Store error code.
        code: String,
        /// Message from the store.
        message: String,
    },

    /// The whole bulk delete call containing this key failed.
    #[error("bulk delete failed: {0}")]
    BulkCallFailed(String),
}

/// Failure of a transfer or of a batch call.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// Source and destination address the same object.
    #[error("source and destination are the same object: {location}")]
    SourceDestinationSame {
        /// The shared location.
        location: ObjectLocation,
    },

    /// Part size is outside `[5 MiB, 5 GiB]`.
    #[error("part size {part_size} is outside the allowed range of 5 MiB to 5 GiB")]
    InvalidPartSize {
        /// The rejected part size.
        part_size: u64,
    },

    /// The object would need more than 10 000 parts at this part size.
    #[error(
        "object of {object_size} bytes needs {parts} parts at part size {part_size}, more than the 10000 allowed"
    )]
    TooManyParts {
        /// Object size in bytes.
        object_size: u64,
        /// Part size in bytes.
        part_size: u64,
        /// Parts that would be required.
        parts: u64,
    },

    /// Fetching source metadata failed.
    #[error("failed to fetch metadata for {location}: {source}")]
    MetadataFetchFailed {
        /// Source object.
        location: ObjectLocation,
        /// Underlying error.
        #[source]
        source: StoreError,
    },

    /// The copy did not succeed.
    #[error("copy to {destination} failed: {cause}")]
    CopyFailed {
        /// Destination object.
        destination: ObjectLocation,
        /// What went wrong.
        #[source]
        cause: CopyFailure,
    },

    /// Aborting a multipart session failed. Logged; never replaces the
    /// error that triggered the abort.
    #[error("failed to abort multipart upload {upload_id} for {destination}: {reason}")]
    MultipartAbortFailed {
        /// Session id.
        upload_id: String,
        /// Destination of the session.
        destination: ObjectLocation,
        /// What went wrong.
        reason: String,
    },

    /// The copy succeeded but deleting the source did not. The destination
    /// object exists.
    #[error("copied but failed to delete source {location}: {cause}")]
    DeleteFailed {
        /// Source object that was not deleted.
        location: ObjectLocation,
        /// What went wrong.
        #[source]
        cause: DeleteFailure,
    },

    /// The batch was cancelled before this request started.
    #[error("batch interrupted before the transfer started")]
    Interrupted,

    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Convenience result type for transfer operations.
pub type TransferResult<T> = Result<T, TransferError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_retry_only_cancelled_and_transient() {
        assert!(StoreError::Cancelled("reset".to_owned()).is_retryable());
        assert!(StoreError::Transient("SlowDown".to_owned()).is_retryable());
        assert!(
            !StoreError::NotFound {
                bucket: "b".to_owned(),
                key: "k".to_owned(),
            }
            .is_retryable()
        );
        assert!(!StoreError::service("AccessDenied", "denied").is_retryable());
        assert!(!StoreError::Internal(anyhow::anyhow!("boom")).is_retryable());
    }

    #[test]
    fn test_should_format_copy_failed_with_status() {
        let err = TransferError::CopyFailed {
            destination: ObjectLocation::new("dst", "k"),
            cause: CopyFailure::Status(StatusCode::INTERNAL_SERVER_ERROR),
        };
        let msg = err.to_string();
        assert!(msg.contains("dst/k"));
        assert!(msg.contains("500"));
    }

    #[test]
    fn test_should_expose_store_error_as_source() {
        let err = TransferError::MetadataFetchFailed {
            location: ObjectLocation::new("src", "missing"),
            source: StoreError::NotFound {
                bucket: "src".to_owned(),
                key: "missing".to_owned(),
            },
        };
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(
            source.as_deref(),
            Some("The specified key does not exist: src/missing")
        );
    }

    #[test]
    fn test_should_format_delete_rejection() {
        let err = TransferError::DeleteFailed {
            location: ObjectLocation::new("src", "k"),
            cause: DeleteFailure::Rejected {
                code: "AccessDenied".to_owned(),
                message: "Access Denied".to_owned(),
            },
        };
        assert!(err.to_string().contains("AccessDenied"));
    }
}
