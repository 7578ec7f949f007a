//! Batch orchestration.
//!
//! A batch is split into groups of `group_size` requests. Groups run one
//! after another; the requests inside a group run concurrently, and the
//! next group starts only once every request of the current one has
//! settled. Outcomes are folded into the [`BatchResult`] after each group,
//! never from inside a running transfer.
//!
//! Cancellation is checked only between groups: a started group always
//! settles, and the requests of every later group are reported as
//! [`TransferError::Interrupted`].

use std::collections::BTreeSet;

use futures::future::join_all;
use tracing::{debug, info, warn};

use ruststack_transfer_model::TransferRequest;

use crate::config::{CopyConfig, MoveConfig};
use crate::error::{TransferError, TransferResult};
use crate::outcome::{BatchResult, FailureStage, TransferOutcome};
use crate::provider::S3Transfer;

/// Requests a batch will actually execute.
///
/// Requests whose source and destination are the same object are dropped,
/// as are exact repeats of an earlier request. Order is preserved.
///
/// # Examples
///
/// ```
/// use ruststack_transfer_core::eligible_requests;
/// use ruststack_transfer_model::{ObjectLocation, TransferRequest};
///
/// let same = TransferRequest::new(ObjectLocation::new("B", "k"), ObjectLocation::new("b", "k"));
/// let real = TransferRequest::new(ObjectLocation::new("a", "k"), ObjectLocation::new("b", "k"));
/// let eligible = eligible_requests(&[same, real.clone(), real.clone()]);
/// assert_eq!(eligible, vec![real]);
/// ```
#[must_use]
pub fn eligible_requests(requests: &[TransferRequest]) -> Vec<TransferRequest> {
    let mut seen = BTreeSet::new();
    requests
        .iter()
        .filter(|request| {
            if request.is_source_destination_same() {
                debug!(location = %request.source, "excluding request with same source and destination");
                return false;
            }
            if !seen.insert(*request) {
                warn!(
                    source = %request.source,
                    destination = %request.destination,
                    "dropping duplicate transfer request"
                );
                return false;
            }
            true
        })
        .cloned()
        .collect()
}

/// Split `items` into consecutive groups of at most `group_size`.
pub(crate) fn partition<T>(items: &[T], group_size: usize) -> impl Iterator<Item = &[T]> {
    items.chunks(group_size.max(1))
}

impl S3Transfer {
    /// Copy every request.
    ///
    /// Returns `Err` only for an invalid `config`, before any remote call.
    /// Every other problem is reported per item in the [`BatchResult`].
    pub async fn copy_objects(
        &self,
        requests: &[TransferRequest],
        config: &CopyConfig,
    ) -> TransferResult<BatchResult> {
        config.validate()?;
        Ok(self.run_batch(requests, config, false).await)
    }

    /// Move every request.
    ///
    /// Without batched delete each source is deleted right after its own
    /// copy. With batched delete the whole batch is copied first and the
    /// sources of successful copies are then removed with bulk deletes.
    pub async fn move_objects(
        &self,
        requests: &[TransferRequest],
        config: &MoveConfig,
    ) -> TransferResult<BatchResult> {
        config.validate()?;
        if config.batched_delete {
            let mut result = self.run_batch(requests, &config.copy, false).await;
            self.reconcile_deletes(&mut result).await;
            Ok(result)
        } else {
            Ok(self.run_batch(requests, &config.copy, true).await)
        }
    }

    async fn run_batch(
        &self,
        requests: &[TransferRequest],
        config: &CopyConfig,
        delete_source: bool,
    ) -> BatchResult {
        let eligible = eligible_requests(requests);
        let groups = eligible.len().div_ceil(config.group_size.max(1));
        info!(
            requested = requests.len(),
            eligible = eligible.len(),
            groups,
            group_size = config.group_size,
            delete_source,
            "starting transfer batch"
        );

        let mut result = BatchResult::default();
        for (index, group) in partition(&eligible, config.group_size).enumerate() {
            if self.cancel.is_cancelled() {
                let remaining = &eligible[index * config.group_size.max(1)..];
                warn!(
                    group = index + 1,
                    groups,
                    skipped = remaining.len(),
                    "transfer batch interrupted"
                );
                for request in remaining {
                    result.record(
                        request.clone(),
                        TransferOutcome::failure(
                            request,
                            FailureStage::Copy,
                            TransferError::Interrupted,
                        ),
                    );
                }
                break;
            }

            let outcomes = join_all(group.iter().map(|request| {
                self.transfer_object(request, config.part_size, delete_source, &config.policy)
            }))
            .await;

            for (request, outcome) in group.iter().zip(outcomes) {
                result.record(request.clone(), outcome);
            }
            debug!(
                group = index + 1,
                groups,
                size = group.len(),
                "transfer group settled"
            );
        }

        info!(
            succeeded = result.success_count(),
            failed = result.failure_count(),
            "transfer batch finished"
        );
        result
    }
}
