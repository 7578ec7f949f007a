//! Bulk copy and move orchestration for S3-compatible object stores.
//!
//! [`S3Transfer`] copies or moves objects between locations, choosing per
//! object between a single server-side copy and a chunked multipart copy,
//! and runs whole batches in bounded concurrent groups with per-item
//! failure isolation.
//!
//! # Architecture
//!
//! ```text
//! copy_objects / move_objects        (batch: sequential groups, concurrent items)
//!        |
//!        v
//! transfer_object                    (same-object guard, HEAD, strategy, delete)
//!        |
//!        +--> single copy            (CopyObject)
//!        +--> multipart engine       (initiate -> parts in parallel -> complete | abort)
//!        |
//!        v
//! RetryPolicy -> dyn ObjectStoreClient
//! ```
//!
//! For a batched move, the reconciler deletes the sources of every
//! successful copy with bulk deletes of at most 1000 keys and moves any key
//! the store refuses to delete into the failure set.

pub mod checksums;
pub mod client;
pub mod config;
pub mod error;
pub mod memory;
mod ops;
pub mod outcome;
pub mod provider;
pub mod retry;
pub mod strategy;

pub use client::ObjectStoreClient;
pub use config::{CopyConfig, MoveConfig, RetryConfig};
pub use error::{StoreError, TransferError, TransferResult};
pub use ops::batch::eligible_requests;
pub use ops::multipart::{MultipartSession, SessionState, part_ranges};
pub use ops::reconcile::MAX_DELETE_BATCH;
pub use outcome::{
    BatchReport, BatchResult, FailureStage, TransferFailure, TransferOutcome, TransferStrategy,
    TransferSuccess,
};
pub use provider::S3Transfer;
pub use retry::RetryPolicy;
pub use strategy::{TransferPolicy, should_use_multipart};
