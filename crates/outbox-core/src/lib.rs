//! # Outbox Core
//!
//! Lease-based entry claiming for the transactional outbox pattern.
//!
//! Producers stage messages in outbox storage under a namespace. Processors
//! then take exclusive, time-limited leases on staged entries, hand them to
//! the real transport, and delete what was delivered. A processor that
//! crashes or stalls simply lets its leases run out; the entries become
//! claimable again and another processor picks them up.
//!
//! This library provides:
//! - Namespaced message and entry types with validated identifiers
//! - The `Publisher` and `ProcessorStorage` contracts
//! - An in-memory `EntryRegistry` and a `PublishRecorder` test double
//! - An `OutboxProcessor` running the claim, deliver, delete cycle
//! - Configuration loading and tracing setup
//!
//! ## Module Organization
//!
//! - [`clock`] - Injected time source for lease evaluation
//! - [`config`] - Processor and logging configuration
//! - [`error`] - Error types for all outbox operations
//! - [`message`] - Messages, identifiers, timestamps, and leases
//! - [`processor`] - The processing loop
//! - [`providers`] - In-memory storage and publisher implementations
//! - [`storage`] - Storage and publisher traits
//! - [`telemetry`] - Tracing subscriber initialisation
//!
//! ## Example
//!
//! ```rust
//! use outbox_core::{
//!     EntryRegistry, ManualClock, Message, Namespace, OutboxProcessor, ProcessorConfig,
//!     PublishRecorder,
//! };
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let clock = Arc::new(ManualClock::default());
//! let registry = EntryRegistry::new(clock.clone());
//! let recorder = PublishRecorder::new();
//!
//! let orders = Namespace::new("orders").unwrap();
//! registry.publish(&orders, &[Message::new("order-1", "created")]);
//!
//! let config = ProcessorConfig {
//!     processor_id: Some("worker-1".to_string()),
//!     ..Default::default()
//! };
//! let processor =
//!     OutboxProcessor::new(&config, registry.clone(), recorder.clone(), clock).unwrap();
//!
//! let report = processor.process_once().await.unwrap();
//! assert_eq!(report.delivered, 1);
//! assert_eq!(registry.count_entries(), 0);
//! assert_eq!(recorder.count_published(), 1);
//! # });
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod message;
pub mod processor;
pub mod providers;
pub mod storage;
pub mod telemetry;

// Re-export commonly used types at crate root for convenience
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{LoggingConfig, OutboxConfig, ProcessorConfig};
pub use error::{ConfigurationError, OutboxError, ValidationError};
pub use message::{
    ClaimedEntry, EntryId, Lease, Message, Namespace, ProcessorId, PublishedMessage, Timestamp,
};
pub use processor::{OutboxProcessor, ProcessReport};
pub use providers::{EntryRegistry, PublishRecorder};
pub use storage::{ProcessorStorage, Publisher};
pub use telemetry::init_tracing;

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
