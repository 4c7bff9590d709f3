//! # Configuration File Loading
//!
//! Loads configuration from TOML files.

use std::path::Path;

use crate::ConfigError;
use crate::config::AppConfig;

/// Loads configuration from a TOML file.
pub fn load_from_toml(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let raw = std::fs::read_to_string(path)?;
    toml::from_str(&raw).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}
