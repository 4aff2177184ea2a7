//! Clock abstraction for testable time
//!
//! Lease expiry is always evaluated against an injected [`Clock`], so tests
//! can move time forward instead of sleeping.

use crate::message::Timestamp;
use chrono::{DateTime, Duration, Utc};
use std::sync::{Arc, PoisonError, RwLock};

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Real system clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// Manually driven clock for tests
///
/// Clones share the same instant, so a test can hand one clone to a registry
/// and keep another to advance time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Arc<RwLock<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            current: Arc::new(RwLock::new(start.as_datetime())),
        }
    }

    /// Jump to an absolute time
    pub fn set(&self, to: Timestamp) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = to.as_datetime();
    }

    /// Move time forward (or backwards for a negative duration)
    ///
    /// Saturates at the representable range like [`Timestamp::add_duration`].
    pub fn advance(&self, by: Duration) {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = Timestamp::from_datetime(*current)
            .add_duration(by)
            .as_datetime();
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Timestamp::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_datetime(*self.current.read().unwrap_or_else(PoisonError::into_inner))
    }
}
