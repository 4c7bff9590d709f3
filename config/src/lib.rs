//! # Configuration System
//!
//! Centralized configuration for the board service:
//! - Configuration structures with `validator` constraints
//! - Environment variable loading (12-factor)
//! - TOML file loading
//! - Precedence: environment > file > defaults

pub mod config;
pub mod file_loader;
pub mod loader;

use std::path::Path;

use thiserror::Error;
use validator::Validate;

pub use config::{
    AppConfig, AssistConfig, AssistProviderKind, FirestoreSettings, ObservabilityConfig,
    ServerConfig, StorageBackendKind, StorageConfig,
};
pub use file_loader::load_from_toml;
pub use loader::{apply_env, load_from_env};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("Invalid value for {variable}: {value:?}")]
    InvalidValue { variable: String, value: String },

    #[error("Configuration invalid: {reason}")]
    Invalid { reason: String },
}

/// Loads the effective configuration: defaults, overlaid by the optional
/// TOML file, overlaid by environment variables, then validated.
pub fn load(file: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut config = match file {
        Some(path) => load_from_toml(path)?,
        None => AppConfig::default(),
    };
    apply_env(&mut config)?;
    config.validate().map_err(|e| ConfigError::Invalid {
        reason: e.to_string(),
    })?;
    Ok(config)
}
