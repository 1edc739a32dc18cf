use figment::{
    providers::{Env, Format, Yaml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Load configuration from a YAML file with environment variable overrides
/// (e.g. `COMICDEX_SERVER__PORT=9090`).
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: Config = Figment::new()
        .merge(Yaml::file(path))
        .merge(Env::prefixed("COMICDEX_").split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from a YAML string (useful for testing).
pub fn load_config_from_str(yaml: &str) -> Result<Config, ConfigError> {
    Figment::new()
        .merge(Yaml::string(yaml))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}
