//! Configuration loader

use config::{Config, Environment, File};
use std::path::Path;

use super::types::AppConfig;
use crate::common::errors::{EngineError, Result};

/// Load configuration from file and environment variables
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with APP__, e.g. `APP__ENGINE__DEFAULT_GAP`)
/// 2. Configuration file (TOML format)
/// 3. Default values
///
/// The result is validated before it is returned.
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    // Try to load from .env file
    dotenvy::dotenv().ok();

    let mut builder = Config::builder();

    if let Some(path) = config_path {
        if Path::new(path).exists() {
            builder = builder.add_source(File::with_name(path).required(false));
        }
    }

    builder = builder.add_source(
        Environment::with_prefix("APP")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("bridge.symbols")
            .try_parsing(true),
    );

    let config: AppConfig = builder
        .build()
        .map_err(|e| EngineError::Configuration(e.to_string()))?
        .try_deserialize()
        .map_err(|e| EngineError::Configuration(e.to_string()))?;

    config.validate()?;
    Ok(config)
}
