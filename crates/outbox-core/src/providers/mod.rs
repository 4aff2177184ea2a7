//! Outbox storage and publisher implementations.
//!
//! This module contains the in-memory implementations of the `Publisher` and
//! `ProcessorStorage` contracts.

pub mod memory;
pub mod recording;

pub use memory::EntryRegistry;
pub use recording::PublishRecorder;
