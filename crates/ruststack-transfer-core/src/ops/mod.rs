//! Transfer operations.
//!
//! Each submodule adds methods to [`crate::provider::S3Transfer`]:
//!
//! - `object`: one request end to end (guard, metadata, copy, optional delete).
//! - `multipart`: the initiate / parts / complete-or-abort state machine.
//! - `batch`: grouping and concurrent execution of many requests.
//! - `reconcile`: bulk deletion of sources after a batched move.
//! - `list`: paginated listing used to build request lists.

pub mod batch;
pub mod list;
pub mod multipart;
pub mod object;
pub mod reconcile;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use ruststack_transfer_model::{ObjectLocation, TransferRequest};

    use crate::config::RetryConfig;
    use crate::memory::InMemoryObjectStore;
    use crate::provider::S3Transfer;
    use crate::retry::RetryPolicy;

    /// Engine over `store` with millisecond backoff.
    pub(crate) fn engine(store: &Arc<InMemoryObjectStore>) -> S3Transfer {
        S3Transfer::new(
            Arc::clone(store) as Arc<dyn crate::client::ObjectStoreClient>,
            RetryPolicy::new(
                RetryConfig::builder()
                    .max_attempts(3)
                    .base_delay_ms(1)
                    .max_delay_ms(2)
                    .build(),
            ),
        )
    }

    /// `src/<key>` to `dst/<key>`.
    pub(crate) fn request(key: &str) -> TransferRequest {
        TransferRequest::new(
            ObjectLocation::new("src", key),
            ObjectLocation::new("dst", key),
        )
    }
}
