//! Boundary contracts between producers, outbox storage, and processors.

use crate::error::OutboxError;
use crate::message::{ClaimedEntry, EntryId, Message, Namespace, ProcessorId, Timestamp};
use async_trait::async_trait;

/// Accepts messages under a namespace
///
/// Producers use this to stage messages in the outbox; processors use it
/// again on the far side to hand claimed messages to the real transport.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publish messages tagged with `namespace`
    async fn publish(&self, namespace: &Namespace, messages: &[Message]) -> Result<(), OutboxError>;
}

/// Storage operations used by processors to drain the outbox
///
/// Implementations must make each entry update all-or-nothing and must
/// treat ids that no longer exist as a no-op rather than an error.
#[async_trait]
pub trait ProcessorStorage: Send + Sync {
    /// Lease every claimable entry to `processor_id` until `claim_deadline`
    async fn claim_entries(
        &self,
        processor_id: &ProcessorId,
        claim_deadline: Timestamp,
    ) -> Result<(), OutboxError>;

    /// Get up to `batch_size` entries owned by `processor_id`, in insertion order
    async fn get_claimed_entries(
        &self,
        processor_id: &ProcessorId,
        batch_size: usize,
    ) -> Result<Vec<ClaimedEntry>, OutboxError>;

    /// Remove entries by id; unknown ids are ignored
    async fn delete_entries(&self, ids: &[EntryId]) -> Result<(), OutboxError>;
}
