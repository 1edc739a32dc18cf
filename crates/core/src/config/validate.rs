use super::{types::Config, ConfigError};

/// Validate a loaded configuration before wiring any services.
///
/// Misconfiguration found here is fatal at startup rather than a runtime
/// surprise.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.updater.concurrency < 1 {
        return Err(ConfigError::Invalid(
            "updater.concurrency must be at least 1".to_string(),
        ));
    }
    if config.search.concurrency_limit < 1 {
        return Err(ConfigError::Invalid(
            "search.concurrency_limit must be at least 1".to_string(),
        ));
    }
    if config.search.rate_rps < 1 {
        return Err(ConfigError::Invalid(
            "search.rate_rps must be at least 1".to_string(),
        ));
    }
    if config.upstream.url.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "upstream.url must not be empty".to_string(),
        ));
    }
    if config.auth.admin_user.is_empty() || config.auth.admin_password.is_empty() {
        return Err(ConfigError::Invalid(
            "auth.admin_user and auth.admin_password must be set".to_string(),
        ));
    }
    Ok(())
}
