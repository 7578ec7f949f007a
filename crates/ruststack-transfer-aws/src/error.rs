//! SDK error classification.
//!
//! | SDK failure | `StoreError` |
//! |-------------|--------------|
//! | timeout, I/O dispatch failure | `Cancelled` |
//! | other dispatch failure, unparsable response | `Transient` |
//! | `NoSuchKey`, `NotFound`, HTTP 404 without a code | `NotFound` |
//! | `SlowDown`, `RequestTimeout`, `InternalError`, HTTP 5xx | `Transient` |
//! | any other service error, including `NoSuchBucket` | `Service` |
//! | request construction failure | `Internal` |

use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use ruststack_transfer_core::StoreError;
use ruststack_transfer_model::ObjectLocation;

/// Service error codes that indicate a temporary condition.
const TRANSIENT_CODES: &[&str] = &[
    "SlowDown",
    "RequestTimeout",
    "InternalError",
    "ServiceUnavailable",
    "Throttling",
    "ThrottlingException",
];

/// Classify an SDK error. `location` names the object for `NotFound`.
pub fn classify_sdk_error<E>(err: &SdkError<E>, location: &ObjectLocation) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    match err {
        SdkError::TimeoutError(_) => StoreError::Cancelled(format!("{}", DisplayErrorContext(err))),
        SdkError::DispatchFailure(failure) if failure.is_timeout() || failure.is_io() => {
            StoreError::Cancelled(format!("{}", DisplayErrorContext(err)))
        }
        SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            StoreError::Transient(format!("{}", DisplayErrorContext(err)))
        }
        SdkError::ServiceError(service) => classify_service_error(
            err.code(),
            service.raw().status().as_u16(),
            err.message().unwrap_or_default(),
            location,
        ),
        _ => StoreError::Internal(anyhow::anyhow!("{}", DisplayErrorContext(err))),
    }
}

/// Classify a service error response by its error code and HTTP status.
///
/// Only a missing object maps to `NotFound`. A 404 carrying another code,
/// such as `NoSuchBucket` or `NoSuchUpload`, is a `Service` error.
fn classify_service_error(
    code: Option<&str>,
    status: u16,
    message: &str,
    location: &ObjectLocation,
) -> StoreError {
    let missing = match code {
        Some(code) => matches!(code, "NoSuchKey" | "NotFound"),
        None => status == 404,
    };
    if missing {
        return StoreError::NotFound {
            bucket: location.bucket.clone(),
            key: location.key.clone(),
        };
    }

    let code = code.unwrap_or("Unknown");
    if TRANSIENT_CODES.contains(&code) || status >= 500 {
        StoreError::Transient(format!("{code} (HTTP {status})"))
    } else {
        StoreError::service(code, message)
    }
}
