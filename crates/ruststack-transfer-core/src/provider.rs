//! The transfer engine entry point.
//!
//! [`S3Transfer`] owns the object store client and the retry policy.
//! Individual operations are implemented in the `ops` submodules as
//! methods on it.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::client::ObjectStoreClient;
use crate::retry::RetryPolicy;

/// Copies and moves objects through an [`ObjectStoreClient`].
///
/// Cheap to clone; all fields are `Arc`-wrapped.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use ruststack_transfer_core::{RetryPolicy, S3Transfer};
/// use ruststack_transfer_core::memory::InMemoryObjectStore;
///
/// let transfer = S3Transfer::new(Arc::new(InMemoryObjectStore::new()), RetryPolicy::default());
/// assert_eq!(transfer.retry_policy().config().max_attempts, 3);
/// ```
#[derive(Debug, Clone)]
pub struct S3Transfer {
    /// Object store client.
    pub(crate) client: Arc<dyn ObjectStoreClient>,
    /// Retry wrapper applied to every remote call.
    pub(crate) retry: Arc<RetryPolicy>,
    /// Stops batches from starting further groups once cancelled.
    pub(crate) cancel: CancellationToken,
}

impl S3Transfer {
    /// Create an engine over `client`.
    #[must_use]
    pub fn new(client: Arc<dyn ObjectStoreClient>, retry: RetryPolicy) -> Self {
        Self {
            client,
            retry: Arc::new(retry),
            cancel: CancellationToken::new(),
        }
    }

    /// Share `token` with the engine. Cancelling it lets the running group
    /// of a batch settle, so multipart sessions still complete or abort,
    /// and reports every request of the remaining groups as interrupted.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that interrupts batches run by this engine and its clones.
    #[must_use]
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// The object store client.
    #[must_use]
    pub fn client(&self) -> &dyn ObjectStoreClient {
        self.client.as_ref()
    }

    /// The retry policy.
    #[must_use]
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }
}
