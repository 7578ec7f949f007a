//! Listing helpers that produce request lists.

use tracing::debug;

use ruststack_transfer_model::input::ListObjectsInput;
use ruststack_transfer_model::output::ObjectSummary;
use ruststack_transfer_model::{ObjectLocation, TransferRequest};

use crate::error::StoreError;
use crate::provider::S3Transfer;

impl S3Transfer {
    /// List every object in `bucket` under `prefix`, following continuation
    /// tokens until the listing is exhausted.
    pub async fn list_all_objects(
        &self,
        bucket: &str,
        prefix: Option<&str>,
    ) -> Result<Vec<ObjectSummary>, StoreError> {
        let mut objects = Vec::new();
        let mut input = ListObjectsInput {
            bucket: bucket.to_owned(),
            prefix: prefix.map(str::to_owned),
            ..ListObjectsInput::default()
        };

        loop {
            let page = self
                .retry
                .run("list_objects", || self.client.list_objects(&input))
                .await?;
            objects.extend(page.objects);
            match page.next_continuation_token {
                Some(token) if input.continuation_token.as_ref() != Some(&token) => {
                    input.continuation_token = Some(token);
                }
                _ => break,
            }
        }

        debug!(bucket, prefix = ?prefix, count = objects.len(), "list_all_objects completed");
        Ok(objects)
    }

    /// One request per object under `source_prefix`, with the prefix
    /// replaced by `destination_prefix` on the destination side.
    pub async fn requests_for_prefix(
        &self,
        source_bucket: &str,
        source_prefix: &str,
        destination_bucket: &str,
        destination_prefix: &str,
    ) -> Result<Vec<TransferRequest>, StoreError> {
        let objects = self
            .list_all_objects(source_bucket, Some(source_prefix).filter(|p| !p.is_empty()))
            .await?;

        Ok(objects
            .into_iter()
            .map(|object| {
                let suffix = object.key.strip_prefix(source_prefix).unwrap_or(&object.key);
                TransferRequest::new(
                    ObjectLocation::new(source_bucket, object.key.as_str()),
                    ObjectLocation::new(destination_bucket, format!("{destination_prefix}{suffix}")),
                )
            })
            .collect())
    }
}
