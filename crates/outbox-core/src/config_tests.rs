//! Tests for [`OutboxConfig`], [`ProcessorConfig`], and [`LoggingConfig`].

use super::*;
use serial_test::serial;
use std::io::Write;

// ============================================================================
// ProcessorConfig tests
// ============================================================================

mod processor_config_tests {
    use super::*;

    /// Verify defaults are valid and match documented values.
    #[test]
    fn test_defaults_are_valid() {
        let config = ProcessorConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.batch_size, 100);
        assert_eq!(config.lease_duration(), chrono::Duration::seconds(30));
        assert_eq!(config.poll_interval(), std::time::Duration::from_millis(1000));
    }

    /// Verify a zero batch size is rejected.
    #[test]
    fn test_zero_batch_size_fails() {
        let config = ProcessorConfig {
            batch_size: 0,
            ..Default::default()
        };

        assert!(matches!(
            config.validate(),
            Err(ValidationError::OutOfRange { field, .. }) if field == "batch_size"
        ));
    }

    /// Verify lease durations outside (0, one day] are rejected.
    #[test]
    fn test_lease_duration_bounds() {
        let zero = ProcessorConfig {
            lease_duration_seconds: 0,
            ..Default::default()
        };
        assert!(zero.validate().is_err());

        let too_long = ProcessorConfig {
            lease_duration_seconds: MAX_LEASE_DURATION_SECONDS + 1,
            ..Default::default()
        };
        assert!(too_long.validate().is_err());
        assert_eq!(
            too_long.lease_duration(),
            chrono::Duration::seconds(MAX_LEASE_DURATION_SECONDS as i64)
        );
    }

    /// Verify a zero poll interval is rejected.
    #[test]
    fn test_zero_poll_interval_fails() {
        let config = ProcessorConfig {
            poll_interval_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    /// Verify a configured processor id is used and an empty one is rejected.
    #[test]
    fn test_resolve_processor_id() {
        let fixed = ProcessorConfig {
            processor_id: Some("worker-1".to_string()),
            ..Default::default()
        };
        assert_eq!(fixed.resolve_processor_id().unwrap().as_str(), "worker-1");

        let generated = ProcessorConfig::default().resolve_processor_id().unwrap();
        assert!(generated.as_str().starts_with("processor-"));

        let empty = ProcessorConfig {
            processor_id: Some(String::new()),
            ..Default::default()
        };
        assert!(empty.validate().is_err());
        assert!(empty.resolve_processor_id().is_err());
    }
}

// ============================================================================
// OutboxConfig parsing tests
// ============================================================================

mod outbox_config_tests {
    use super::*;

    /// Verify an empty document yields the default configuration.
    #[test]
    fn test_empty_yaml_gives_defaults() {
        let config = OutboxConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, OutboxConfig::default());
    }

    /// Verify partial documents keep defaults for missing fields.
    #[test]
    fn test_partial_yaml_overrides() {
        let yaml = r#"
processor:
  processor_id: "p1"
  batch_size: 25
logging:
  json_format: true
"#;
        let config = OutboxConfig::from_yaml_str(yaml).unwrap();

        assert_eq!(config.processor.processor_id.as_deref(), Some("p1"));
        assert_eq!(config.processor.batch_size, 25);
        assert_eq!(config.processor.lease_duration_seconds, 30);
        assert!(config.logging.json_format);
        assert_eq!(config.logging.level, "info");
    }

    /// Verify invalid values are reported as configuration errors.
    #[test]
    fn test_invalid_yaml_values_fail() {
        let result = OutboxConfig::from_yaml_str("processor:\n  batch_size: 0\n");
        assert!(matches!(result, Err(ConfigurationError::Invalid { .. })));

        let result = OutboxConfig::from_yaml_str("processor: \"not a map\"");
        assert!(matches!(result, Err(ConfigurationError::Parsing { .. })));
    }
}

// ============================================================================
// Layered loading tests
// ============================================================================

mod load_tests {
    use super::*;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    /// Verify loading with no sources gives defaults.
    #[test]
    #[serial]
    fn test_load_without_sources() {
        let config = OutboxConfig::load(None).unwrap();
        assert_eq!(config.processor.batch_size, 100);
    }

    /// Verify values are read from a file.
    #[test]
    #[serial]
    fn test_load_from_file() {
        let file = write_config("processor:\n  batch_size: 7\n  lease_duration_seconds: 12\n");

        let config = OutboxConfig::load(Some(file.path())).unwrap();

        assert_eq!(config.processor.batch_size, 7);
        assert_eq!(config.processor.lease_duration_seconds, 12);
    }

    /// Verify environment variables override file values.
    #[test]
    #[serial]
    fn test_environment_overrides_file() {
        let file = write_config("processor:\n  batch_size: 7\n");
        std::env::set_var("OUTBOX__PROCESSOR__BATCH_SIZE", "42");

        let result = OutboxConfig::load(Some(file.path()));
        std::env::remove_var("OUTBOX__PROCESSOR__BATCH_SIZE");

        assert_eq!(result.unwrap().processor.batch_size, 42);
    }

    /// Verify a missing explicit file is an error.
    #[test]
    #[serial]
    fn test_missing_file_fails() {
        let result = OutboxConfig::load(Some(Path::new("/nonexistent/outbox.yaml")));
        assert!(matches!(result, Err(ConfigurationError::Parsing { .. })));
    }
}
