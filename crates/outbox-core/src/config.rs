//! Configuration types for outbox processors.
//!
//! All fields carry serde defaults, so an empty source produces a valid
//! configuration.

use crate::error::{ConfigurationError, ValidationError};
use crate::message::ProcessorId;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// Prefix for environment overrides, e.g. `OUTBOX__PROCESSOR__BATCH_SIZE=10`
pub const ENV_PREFIX: &str = "OUTBOX";

/// Upper bound on a single lease (one day)
pub const MAX_LEASE_DURATION_SECONDS: u64 = 86_400;

/// Top-level outbox configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutboxConfig {
    /// Processor loop settings
    pub processor: ProcessorConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl OutboxConfig {
    /// Load configuration from an optional file plus `OUTBOX__` environment variables
    ///
    /// Sources are applied in order, later ones overriding earlier ones:
    ///  1. `path`, if given (format taken from the file extension)
    ///  2. Environment variables prefixed `OUTBOX__` with `__` separators
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigurationError> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let loaded: Self = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        loaded.validate()?;
        Ok(loaded)
    }

    /// Parse and validate configuration from a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigurationError> {
        let parsed: Self = serde_yaml::from_str(yaml).map_err(|e| ConfigurationError::Parsing {
            message: e.to_string(),
        })?;

        parsed.validate()?;
        Ok(parsed)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.processor
            .validate()
            .map_err(|e| ConfigurationError::Invalid {
                message: e.to_string(),
            })
    }
}

/// Processor loop configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Fixed processor identity; a random one is generated when absent
    pub processor_id: Option<String>,

    /// Maximum entries fetched per cycle
    pub batch_size: usize,

    /// How long a claim keeps other processors away, in seconds
    pub lease_duration_seconds: u64,

    /// Delay between processing cycles, in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            processor_id: None,
            batch_size: 100,
            lease_duration_seconds: 30,
            poll_interval_ms: 1000,
        }
    }
}

impl ProcessorConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.batch_size == 0 {
            return Err(ValidationError::OutOfRange {
                field: "batch_size".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        if self.lease_duration_seconds == 0 {
            return Err(ValidationError::OutOfRange {
                field: "lease_duration_seconds".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        if self.lease_duration_seconds > MAX_LEASE_DURATION_SECONDS {
            return Err(ValidationError::OutOfRange {
                field: "lease_duration_seconds".to_string(),
                message: format!("maximum {} seconds", MAX_LEASE_DURATION_SECONDS),
            });
        }

        if self.poll_interval_ms == 0 {
            return Err(ValidationError::OutOfRange {
                field: "poll_interval_ms".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        if let Some(id) = &self.processor_id {
            ProcessorId::new(id.as_str())?;
        }

        Ok(())
    }

    /// The configured processor ID, or a freshly generated one
    pub fn resolve_processor_id(&self) -> Result<ProcessorId, ValidationError> {
        match &self.processor_id {
            Some(id) => ProcessorId::new(id.as_str()),
            None => Ok(ProcessorId::generate()),
        }
    }

    pub fn lease_duration(&self) -> chrono::Duration {
        let seconds = self.lease_duration_seconds.min(MAX_LEASE_DURATION_SECONDS);
        chrono::Duration::seconds(seconds as i64)
    }

    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.poll_interval_ms)
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence when set
    pub level: String,

    /// Enable JSON structured logging
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}
