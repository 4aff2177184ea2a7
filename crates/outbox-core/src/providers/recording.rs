//! In-memory publish recorder.
//!
//! Records every message handed to it, tagged with its namespace, without
//! delivering anything. Serves as the downstream transport fake a processor
//! publishes claimed entries into.

use crate::error::OutboxError;
use crate::message::{Message, Namespace, PublishedMessage};
use crate::storage::Publisher;
use async_trait::async_trait;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::info;

#[cfg(test)]
#[path = "recording_tests.rs"]
mod tests;

/// Thread-safe ordered log of published messages
///
/// Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct PublishRecorder {
    published: Arc<RwLock<Vec<PublishedMessage>>>,
}

impl PublishRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<PublishedMessage>> {
        self.published.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<PublishedMessage>> {
        self.published.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append each message to the log under `namespace`
    pub fn record(&self, namespace: &Namespace, messages: &[Message]) {
        let records = messages.iter().map(|message| PublishedMessage {
            message: message.clone(),
            namespace: namespace.clone(),
        });

        self.write().extend(records);
        info!(namespace = %namespace, count = messages.len(), "Recorded published messages");
    }

    /// Snapshot of the full log in insertion order
    pub fn list_published(&self) -> Vec<PublishedMessage> {
        self.read().clone()
    }

    pub fn count_published(&self) -> usize {
        self.read().len()
    }

    /// Empty the log and return what it held, as one atomic step
    pub fn clear(&self) -> Vec<PublishedMessage> {
        let drained = std::mem::take(&mut *self.write());
        info!(count = drained.len(), "Cleared published messages");
        drained
    }
}

#[async_trait]
impl Publisher for PublishRecorder {
    async fn publish(
        &self,
        namespace: &Namespace,
        messages: &[Message],
    ) -> Result<(), OutboxError> {
        self.record(namespace, messages);
        Ok(())
    }
}
