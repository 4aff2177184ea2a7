//! Error types for outbox storage and processing.

use chrono::Duration;
use thiserror::Error;

/// Comprehensive error type for all outbox operations
///
/// The in-memory registry never produces most of these; they exist so that a
/// durable backend implementing the same contracts can report its failure
/// modes through one type.
#[derive(Debug, Error)]
pub enum OutboxError {
    #[error("Persistence failure: {message}")]
    Persistence { message: String },

    #[error("Lease on entry '{entry_id}' changed while held by '{processor_id}'")]
    StaleLease {
        entry_id: String,
        processor_id: String,
    },

    #[error("Entry not found: {entry_id}")]
    NotFound { entry_id: String },

    #[error("Delivery failed for namespace '{namespace}': {message}")]
    DeliveryFailed { namespace: String, message: String },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

impl OutboxError {
    /// Check if error is transient and should be retried
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Persistence { .. } => true,
            Self::StaleLease { .. } => true,
            Self::NotFound { .. } => false,
            Self::DeliveryFailed { .. } => true,
            Self::Validation(_) => false,
            Self::Configuration(_) => false,
        }
    }

    /// Check if error should be retried
    pub fn should_retry(&self) -> bool {
        self.is_transient()
    }

    /// Errors that callers of claim and delete must tolerate silently
    pub fn is_benign(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Get suggested retry delay
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Persistence { .. } => Some(Duration::seconds(1)),
            Self::StaleLease { .. } => Some(Duration::zero()),
            Self::DeliveryFailed { .. } => Some(Duration::seconds(5)),
            _ => None,
        }
    }
}

/// Validation errors for domain identifiers and configuration values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    Required { field: String },

    #[error("Invalid format for {field}: {message}")]
    InvalidFormat { field: String, message: String },

    #[error("Value out of range for {field}: {message}")]
    OutOfRange { field: String, message: String },
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Configuration parsing failed: {message}")]
    Parsing { message: String },
}

impl From<config::ConfigError> for ConfigurationError {
    fn from(err: config::ConfigError) -> Self {
        Self::Parsing {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
