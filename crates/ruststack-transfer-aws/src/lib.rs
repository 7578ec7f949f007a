//! [`ObjectStoreClient`](ruststack_transfer_core::ObjectStoreClient) over
//! `aws-sdk-s3`.
//!
//! [`AwsObjectStore`] translates each transfer operation into the matching
//! S3 API call and classifies SDK failures into
//! [`StoreError`](ruststack_transfer_core::StoreError) so the retry wrapper
//! can tell transient conditions from logical errors.
//!
//! ```text
//! AwsClientConfig::from_env() ──► build_client() ──► AwsObjectStore::new(client)
//! ```

pub mod client;
pub mod config;
pub mod error;

pub use client::AwsObjectStore;
pub use config::{AwsClientConfig, build_client};
pub use error::classify_sdk_error;
