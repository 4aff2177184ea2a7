//! In-memory entry registry implementation.
//!
//! This module provides the reference model of the outbox claiming protocol:
//! - Insertion-ordered entry storage shared by producers and processors
//! - Time-bounded leases evaluated against an injected clock
//! - Claim sweeps, ownership-gated batch retrieval, and idempotent deletes
//! - Thread-safe concurrent access behind a single readers-writer lock
//!
//! A durable backend must satisfy the same observable behavior.

use crate::clock::{Clock, SystemClock};
use crate::error::OutboxError;
use crate::message::{ClaimedEntry, EntryId, Lease, Message, Namespace, ProcessorId, Timestamp};
use crate::storage::{ProcessorStorage, Publisher};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;

// ============================================================================
// Internal Storage Structures
// ============================================================================

/// An entry stored in the registry with its lease state
#[derive(Debug, Clone)]
struct StoredEntry {
    namespace: Namespace,
    id: EntryId,
    key: Bytes,
    payload: Bytes,
    lease: Lease,
}

impl StoredEntry {
    fn from_message(namespace: &Namespace, message: &Message) -> Self {
        Self {
            namespace: namespace.clone(),
            id: EntryId::new(),
            key: message.key.clone(),
            payload: message.payload.clone(),
            lease: Lease::Unclaimed,
        }
    }

    fn to_claimed(&self) -> ClaimedEntry {
        ClaimedEntry {
            namespace: self.namespace.clone(),
            id: self.id.clone(),
            key: self.key.clone(),
            payload: self.payload.clone(),
        }
    }
}

// ============================================================================
// EntryRegistry
// ============================================================================

/// In-memory outbox entry storage
///
/// Clones share the same entries. Entries are only ever removed by
/// [`EntryRegistry::delete_entries`]; lease expiry never drops an entry.
#[derive(Clone)]
pub struct EntryRegistry {
    entries: Arc<RwLock<Vec<StoredEntry>>>,
    clock: Arc<dyn Clock>,
}

impl EntryRegistry {
    /// Create an empty registry evaluating leases against `clock`
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
            clock,
        }
    }

    // Mutations replace whole field values, so a poisoned guard is still consistent.
    fn read(&self) -> RwLockReadGuard<'_, Vec<StoredEntry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<StoredEntry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append one unclaimed entry per message, returning the assigned ids in order
    pub fn publish(&self, namespace: &Namespace, messages: &[Message]) -> Vec<EntryId> {
        let mut entries = self.write();

        let ids = messages
            .iter()
            .map(|message| {
                let entry = StoredEntry::from_message(namespace, message);
                let id = entry.id.clone();
                entries.push(entry);
                id
            })
            .collect();

        info!(namespace = %namespace, count = messages.len(), "Published entries to outbox");
        ids
    }

    /// Lease every claimable entry to `processor_id` until `claim_deadline`
    ///
    /// Entries with a live lease are skipped whoever holds them, including
    /// `processor_id` itself; a lease is not extended by re-claiming. Returns
    /// the number of entries leased by this sweep.
    pub fn claim_entries(&self, processor_id: &ProcessorId, claim_deadline: Timestamp) -> usize {
        let mut entries = self.write();
        let now = self.clock.now();

        let mut claimed = 0;
        for entry in entries.iter_mut() {
            if entry.lease.is_live(&now) {
                continue;
            }

            entry.lease = Lease::Held {
                processor_id: processor_id.clone(),
                until: claim_deadline,
            };
            claimed += 1;
        }

        debug!(
            processor_id = %processor_id,
            claimed,
            deadline = %claim_deadline,
            "Claim sweep complete"
        );
        claimed
    }

    /// Get copies of up to `batch_size` entries owned by `processor_id`
    ///
    /// Ownership, not lease freshness, decides visibility. There is no cursor:
    /// the same first matches are returned until they are deleted or claimed
    /// away.
    pub fn fetch_claimed(
        &self,
        processor_id: &ProcessorId,
        batch_size: usize,
    ) -> Vec<ClaimedEntry> {
        let entries = self.read();

        let batch: Vec<ClaimedEntry> = entries
            .iter()
            .filter(|entry| entry.lease.is_owned_by(processor_id))
            .take(batch_size)
            .map(StoredEntry::to_claimed)
            .collect();

        debug!(
            processor_id = %processor_id,
            batch_size,
            returned = batch.len(),
            "Fetched claimed entries"
        );
        batch
    }

    /// Remove every entry whose id is listed, returning how many were removed
    ///
    /// Unknown or already-deleted ids are ignored.
    pub fn delete_entries(&self, ids: &[EntryId]) -> usize {
        let doomed: HashSet<&EntryId> = ids.iter().collect();
        let mut entries = self.write();

        let before = entries.len();
        entries.retain(|entry| !doomed.contains(&entry.id));
        let removed = before - entries.len();

        info!(
            requested = ids.len(),
            removed,
            "Deleted entries from outbox"
        );
        removed
    }

    /// Total number of entries across all namespaces and lease states
    pub fn count_entries(&self) -> usize {
        self.read().len()
    }

    /// Number of entries a claim sweep would take at the clock's current time
    pub fn count_claimable(&self) -> usize {
        let now = self.clock.now();
        self.read()
            .iter()
            .filter(|entry| entry.lease.is_claimable(&now))
            .count()
    }
}

impl Default for EntryRegistry {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl std::fmt::Debug for EntryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryRegistry")
            .field("entries", &self.count_entries())
            .finish()
    }
}

#[async_trait]
impl Publisher for EntryRegistry {
    async fn publish(
        &self,
        namespace: &Namespace,
        messages: &[Message],
    ) -> Result<(), OutboxError> {
        EntryRegistry::publish(self, namespace, messages);
        Ok(())
    }
}

#[async_trait]
impl ProcessorStorage for EntryRegistry {
    async fn claim_entries(
        &self,
        processor_id: &ProcessorId,
        claim_deadline: Timestamp,
    ) -> Result<(), OutboxError> {
        EntryRegistry::claim_entries(self, processor_id, claim_deadline);
        Ok(())
    }

    async fn get_claimed_entries(
        &self,
        processor_id: &ProcessorId,
        batch_size: usize,
    ) -> Result<Vec<ClaimedEntry>, OutboxError> {
        Ok(self.fetch_claimed(processor_id, batch_size))
    }

    async fn delete_entries(&self, ids: &[EntryId]) -> Result<(), OutboxError> {
        EntryRegistry::delete_entries(self, ids);
        Ok(())
    }
}
