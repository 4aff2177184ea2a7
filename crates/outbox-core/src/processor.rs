//! # Outbox Processor
//!
//! Drives the claiming protocol from the processor side: claim a sweep of
//! entries, fetch a batch of the ones this processor owns, hand them to a
//! downstream [`Publisher`] grouped by namespace, and delete what was
//! delivered.
//!
//! Entries whose delivery fails are left in storage under this processor's
//! lease. The same processor sees them again on its next fetch, and any
//! processor may take them over once the lease expires.

use crate::clock::Clock;
use crate::config::ProcessorConfig;
use crate::error::OutboxError;
use crate::message::{ClaimedEntry, EntryId, Message, Namespace, ProcessorId};
use crate::storage::{ProcessorStorage, Publisher};
use chrono::Duration;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, instrument, warn};

#[cfg(test)]
#[path = "processor_tests.rs"]
mod tests;

/// Outcome of one processing cycle
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessReport {
    /// Entries fetched for this processor
    pub claimed: usize,
    /// Entries published downstream and deleted
    pub delivered: usize,
    /// Entries whose publish failed and remain leased
    pub failed: usize,
}

impl ProcessReport {
    pub fn is_idle(&self) -> bool {
        self.claimed == 0
    }
}

/// Claims, delivers, and deletes outbox entries on behalf of one processor
pub struct OutboxProcessor<S, P> {
    storage: S,
    publisher: P,
    clock: Arc<dyn Clock>,
    processor_id: ProcessorId,
    batch_size: usize,
    lease_duration: Duration,
    poll_interval: std::time::Duration,
}

impl<S, P> OutboxProcessor<S, P>
where
    S: ProcessorStorage,
    P: Publisher,
{
    /// Create a processor from validated configuration
    pub fn new(
        config: &ProcessorConfig,
        storage: S,
        publisher: P,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, OutboxError> {
        config.validate()?;

        Ok(Self {
            storage,
            publisher,
            clock,
            processor_id: config.resolve_processor_id()?,
            batch_size: config.batch_size,
            lease_duration: config.lease_duration(),
            poll_interval: config.poll_interval(),
        })
    }

    pub fn processor_id(&self) -> &ProcessorId {
        &self.processor_id
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Run a single claim, fetch, deliver, delete cycle
    #[instrument(skip(self), fields(processor_id = %self.processor_id))]
    pub async fn process_once(&self) -> Result<ProcessReport, OutboxError> {
        let claim_deadline = self.clock.now().add_duration(self.lease_duration);
        self.storage
            .claim_entries(&self.processor_id, claim_deadline)
            .await?;

        let batch = self
            .storage
            .get_claimed_entries(&self.processor_id, self.batch_size)
            .await?;

        let mut report = ProcessReport {
            claimed: batch.len(),
            ..Default::default()
        };
        if batch.is_empty() {
            return Ok(report);
        }

        let mut delivered: Vec<EntryId> = Vec::with_capacity(batch.len());
        for (namespace, entries) in group_by_namespace(batch) {
            let messages: Vec<Message> = entries.iter().map(ClaimedEntry::to_message).collect();

            match self.publisher.publish(&namespace, &messages).await {
                Ok(()) => {
                    delivered.extend(entries.into_iter().map(|entry| entry.id));
                }
                Err(e) => {
                    warn!(
                        namespace = %namespace,
                        count = entries.len(),
                        error = %e,
                        "Delivery failed; entries stay leased for retry"
                    );
                    report.failed += entries.len();
                }
            }
        }

        if !delivered.is_empty() {
            self.storage.delete_entries(&delivered).await?;
        }
        report.delivered = delivered.len();

        info!(
            claimed = report.claimed,
            delivered = report.delivered,
            failed = report.failed,
            "Processing cycle complete"
        );
        Ok(report)
    }

    /// Process cycles every poll interval until `shutdown` turns `true`
    ///
    /// A failed cycle is logged and retried on the next tick.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        info!(processor_id = %self.processor_id, "Outbox processor started");

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.process_once().await {
                        error!(
                            processor_id = %self.processor_id,
                            error = %e,
                            "Processing cycle failed"
                        );
                    }
                }
                changed = shutdown.changed() => {
                    // Sender dropped; treat as shutdown.
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!(processor_id = %self.processor_id, "Outbox processor stopped");
    }
}

/// Split a batch into per-namespace groups, in order of first appearance
fn group_by_namespace(batch: Vec<ClaimedEntry>) -> Vec<(Namespace, Vec<ClaimedEntry>)> {
    let mut groups: Vec<(Namespace, Vec<ClaimedEntry>)> = Vec::new();

    for entry in batch {
        match groups.iter().position(|(ns, _)| *ns == entry.namespace) {
            Some(index) => groups[index].1.push(entry),
            None => groups.push((entry.namespace.clone(), vec![entry])),
        }
    }

    groups
}
