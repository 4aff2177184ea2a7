//! Common test utilities for outbox integration tests
//!
//! This module provides:
//! - A shared outbox fixture wired to a manual clock
//! - A publisher whose availability can be switched at runtime
//! - Helpers for building messages and processor configuration

use async_trait::async_trait;
use outbox_core::{
    Clock, EntryRegistry, ManualClock, Message, Namespace, OutboxError, OutboxProcessor,
    ProcessorConfig, PublishRecorder, Publisher, Timestamp,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

// ============================================================================
// Outbox fixture
// ============================================================================

/// Registry and clock sharing one instant, starting at a fixed time
#[derive(Clone)]
#[allow(dead_code)]
pub struct TestOutbox {
    pub clock: ManualClock,
    pub registry: EntryRegistry,
}

impl TestOutbox {
    #[allow(dead_code)]
    pub fn new() -> Self {
        let clock = ManualClock::new(start_time());
        let registry = EntryRegistry::new(Arc::new(clock.clone()));
        Self { clock, registry }
    }

    /// Stage `count` messages keyed `<prefix>-<n>` under `namespace`
    #[allow(dead_code)]
    pub fn stage(&self, namespace: &str, prefix: &str, count: usize) {
        self.registry
            .publish(&namespace_of(namespace), &messages(prefix, count));
    }

    /// Build a processor over this outbox
    #[allow(dead_code)]
    pub fn processor<P: Publisher>(
        &self,
        processor_id: &str,
        batch_size: usize,
        publisher: P,
    ) -> OutboxProcessor<EntryRegistry, P> {
        OutboxProcessor::new(
            &processor_config(processor_id, batch_size),
            self.registry.clone(),
            publisher,
            Arc::new(self.clock.clone()),
        )
        .expect("valid processor config")
    }

    /// The current fixture time plus `seconds`
    #[allow(dead_code)]
    pub fn deadline(&self, seconds: i64) -> Timestamp {
        self.clock
            .now()
            .add_duration(chrono::Duration::seconds(seconds))
    }

    /// Move the shared clock forward by whole seconds
    #[allow(dead_code)]
    pub fn advance_seconds(&self, seconds: i64) {
        self.clock.advance(chrono::Duration::seconds(seconds));
    }
}

// ============================================================================
// Switchable publisher
// ============================================================================

/// Publisher that records deliveries while available and fails otherwise
#[derive(Clone)]
#[allow(dead_code)]
pub struct SwitchablePublisher {
    available: Arc<AtomicBool>,
    attempts: Arc<AtomicUsize>,
    pub recorder: PublishRecorder,
}

impl SwitchablePublisher {
    #[allow(dead_code)]
    pub fn new(available: bool) -> Self {
        Self {
            available: Arc::new(AtomicBool::new(available)),
            attempts: Arc::new(AtomicUsize::new(0)),
            recorder: PublishRecorder::new(),
        }
    }

    #[allow(dead_code)]
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of publish calls made, successful or not
    #[allow(dead_code)]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Publisher for SwitchablePublisher {
    async fn publish(
        &self,
        namespace: &Namespace,
        messages: &[Message],
    ) -> Result<(), OutboxError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if !self.available.load(Ordering::SeqCst) {
            return Err(OutboxError::DeliveryFailed {
                namespace: namespace.to_string(),
                message: "transport unavailable".to_string(),
            });
        }

        self.recorder.record(namespace, messages);
        Ok(())
    }
}

// ============================================================================
// Builders
// ============================================================================

/// Fixed start instant used by every fixture
#[allow(dead_code)]
pub fn start_time() -> Timestamp {
    "2026-03-01T12:00:00Z".parse().expect("valid timestamp")
}

#[allow(dead_code)]
pub fn namespace_of(name: &str) -> Namespace {
    Namespace::new(name).expect("valid namespace")
}

/// Messages keyed `<prefix>-0` .. `<prefix>-<count - 1>`
#[allow(dead_code)]
pub fn messages(prefix: &str, count: usize) -> Vec<Message> {
    (0..count)
        .map(|i| Message::new(format!("{}-{}", prefix, i), format!("payload-{}", i)))
        .collect()
}

/// Processor configuration with a 30 second lease and 10 ms poll interval
#[allow(dead_code)]
pub fn processor_config(processor_id: &str, batch_size: usize) -> ProcessorConfig {
    ProcessorConfig {
        processor_id: Some(processor_id.to_string()),
        batch_size,
        lease_duration_seconds: 30,
        poll_interval_ms: 10,
    }
}

/// Keys of recorded messages as UTF-8 strings, in delivery order
#[allow(dead_code)]
pub fn recorded_keys(recorder: &PublishRecorder) -> Vec<String> {
    recorder
        .list_published()
        .iter()
        .map(|published| String::from_utf8_lossy(&published.message.key).into_owned())
        .collect()
}
