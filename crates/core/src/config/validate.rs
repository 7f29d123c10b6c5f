use super::{types::Config, ConfigError};

/// Validate configuration
///
/// Checks the cross-field constraints serde defaults cannot express:
/// - server port is not 0
/// - at least one menu attempt and one stabilization read
/// - converter delimiter and decimal mark differ
/// - the agent and orchestrator agree on the download directory
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.scraper.menu_retries == 0 {
        return Err(ConfigError::ValidationError(
            "scraper.menu_retries must be at least 1".to_string(),
        ));
    }

    if config.detector.stable_reads == 0 {
        return Err(ConfigError::ValidationError(
            "detector.stable_reads must be at least 1".to_string(),
        ));
    }

    if config.converter.delimiter == config.converter.decimal_mark {
        return Err(ConfigError::ValidationError(
            "converter.delimiter and converter.decimal_mark must differ".to_string(),
        ));
    }

    if config.agent.download_dir != config.orchestrator.download_dir {
        return Err(ConfigError::ValidationError(
            "agent.download_dir and orchestrator.download_dir must match".to_string(),
        ));
    }

    Ok(())
}
