//! Request and response shapes for RustStack bulk object transfers.
//!
//! This crate holds the plain data that crosses the boundary between the
//! transfer engine and an object store client. It carries no I/O and no
//! policy; the only logic here is the explicit mapping from a caller's
//! [`TransferRequest`] into each per-operation input shape, and from a
//! multipart completion into a copy result.
//!
//! ```text
//! TransferRequest ──► CopyObjectInput              (single-shot path)
//!                 ├─► CreateMultipartUploadInput   (lock-retention stripped)
//!                 └─► UploadPartCopyInput × N      (one per byte range)
//!
//! CompleteMultipartUploadOutput ──► CopyObjectOutput
//! ```

pub mod input;
pub mod location;
pub mod output;
pub mod request;
pub mod types;

pub use location::ObjectLocation;
pub use request::{ObjectOverrides, TransferRequest};
pub use types::{ByteRange, CompletedPart, ObjectIdentifier};
