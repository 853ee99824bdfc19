//! Configuration validation utilities.

use super::error::{ConfigError, ConfigResult};
use super::schema::{DeliveryConfig, LogOutput, LoggingConfig, ServerConfig, SwitchboardConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &SwitchboardConfig) -> ConfigResult<()> {
    validate_logging_config(&config.logging)?;
    config
        .engine
        .validate()
        .map_err(|e| ConfigError::validation(e.to_string()))?;
    validate_delivery_config(&config.delivery)?;
    validate_server_config(&config.server)?;
    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.filters.keys().any(|module| module.trim().is_empty()) {
        return Err(ConfigError::validation("Log filter module cannot be empty"));
    }

    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::validation(
            "File log output requires logging.file_path",
        ));
    }

    Ok(())
}

fn validate_delivery_config(delivery: &DeliveryConfig) -> ConfigResult<()> {
    if delivery.timeout_ms == 0 {
        return Err(ConfigError::validation(
            "Delivery timeout must be greater than 0",
        ));
    }
    Ok(())
}

fn validate_server_config(server: &ServerConfig) -> ConfigResult<()> {
    if server.host.is_empty() {
        return Err(ConfigError::validation("Server host cannot be empty"));
    }

    if server.port == 0 {
        return Err(ConfigError::InvalidPort(server.port));
    }

    if !server.path.starts_with('/') {
        return Err(ConfigError::validation("Path must start with '/'"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&SwitchboardConfig::default()).is_ok());
    }

    #[test]
    fn test_validate_engine_timeout() {
        let mut config = SwitchboardConfig::default();
        config.engine.sync_response_timeout_ms = 5000;

        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
        assert!(err.to_string().contains("5000"));
    }

    #[test]
    fn test_validate_delivery_timeout() {
        let mut config = SwitchboardConfig::default();
        config.delivery.timeout_ms = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_server() {
        let mut config = SwitchboardConfig::default();
        config.server.port = 0;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidPort(0))
        ));

        let mut config = SwitchboardConfig::default();
        config.server.path = "slack/actions".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_file_output_needs_path() {
        let mut config = SwitchboardConfig::default();
        config.logging.output = LogOutput::File;
        assert!(validate_config(&config).is_err());

        config.logging.file_path = Some("logs/switchboard.log".into());
        assert!(validate_config(&config).is_ok());
    }
}
