//! Configuration validation utilities.

use ecard_binding::ResponseRenderer;

use super::error::{ConfigError, ConfigResult};
use super::schema::{EcardConfig, LogOutput, LoggingConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &EcardConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;

    // The renderer owns the header name rules, so building one is the check.
    ResponseRenderer::from_config(&config.binding)
        .map_err(|e| ConfigError::validation(format!("binding: {e}")))?;

    Ok(())
}

/// Validates logging configuration.
fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }

    if logging.max_files == 0 {
        return Err(ConfigError::validation(
            "logging.max_files must be greater than 0",
        ));
    }

    if let Some(module) = logging.filters.keys().find(|m| m.trim().is_empty()) {
        return Err(ConfigError::validation(format!(
            "Invalid logging filter target: {module:?}"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;
    use ecard_binding::BindingConfig;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&EcardConfig::default()).is_ok());
    }

    #[test]
    fn test_file_output_requires_path() {
        let mut config = EcardConfig::default();
        config.logging.output = LogOutput::File;

        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { ref field } if field == "logging.file_path"));

        config.logging.file_path = Some(PathBuf::from("/var/log/ecard/ecard.log"));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_max_files_must_be_positive() {
        let mut config = EcardConfig::default();
        config.logging.max_files = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_blank_filter_target_rejected() {
        let mut config = EcardConfig::default();
        config.logging.filters.insert(" ".into(), LogLevel::Debug);
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_invalid_minor_result_header_rejected() {
        let config = EcardConfig {
            binding: BindingConfig {
                minor_result_header: "Result Minor".into(),
                ..Default::default()
            },
            ..Default::default()
        };

        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("binding"));
    }
}
