//! # Environment Variable Loader
//!
//! Loads configuration from environment variables following 12-factor app
//! principles. Environment variables override file-provided values.
//!
//! # Naming Convention
//! - `CF_HOST`, `CF_PORT`: server bind address
//! - `CF_STORAGE_BACKEND`: `memory` or `firestore`
//! - `CF_FIRESTORE_PROJECT_ID`, `CF_FIRESTORE_DATABASE_ID`,
//!   `CF_FIRESTORE_BASE_URL`, `CF_FIRESTORE_TOKEN`: Firestore settings
//! - `CF_ASSIST_PROVIDER`: `mock` or `openai`
//! - `CF_OPENAI_API_KEY`, `CF_OPENAI_MODEL`, `CF_OPENAI_BASE_URL`: assist
//!   settings
//! - `CF_LOG_FILTER`: tracing filter directive

use std::env;

use crate::config::AppConfig;
use crate::ConfigError;

/// Applies environment overrides on top of the given configuration.
pub fn apply_env(config: &mut AppConfig) -> Result<(), ConfigError> {
    if let Ok(host) = env::var("CF_HOST") {
        config.server.host = host;
    }
    if let Ok(port) = env::var("CF_PORT") {
        config.server.port = port
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                variable: "CF_PORT".to_string(),
                value: port,
            })?;
    }

    if let Ok(backend) = env::var("CF_STORAGE_BACKEND") {
        config.storage.backend = backend
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                variable: "CF_STORAGE_BACKEND".to_string(),
                value: backend,
            })?;
    }
    if let Ok(project_id) = env::var("CF_FIRESTORE_PROJECT_ID") {
        config.storage.firestore.project_id = project_id;
    }
    if let Ok(database_id) = env::var("CF_FIRESTORE_DATABASE_ID") {
        config.storage.firestore.database_id = database_id;
    }
    if let Ok(base_url) = env::var("CF_FIRESTORE_BASE_URL") {
        config.storage.firestore.base_url = Some(base_url);
    }
    if let Ok(token) = env::var("CF_FIRESTORE_TOKEN") {
        config.storage.firestore.bearer_token = Some(token);
    }

    if let Ok(provider) = env::var("CF_ASSIST_PROVIDER") {
        config.assist.provider = provider
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                variable: "CF_ASSIST_PROVIDER".to_string(),
                value: provider,
            })?;
    }
    if let Ok(api_key) = env::var("CF_OPENAI_API_KEY") {
        config.assist.api_key = api_key;
    }
    if let Ok(model) = env::var("CF_OPENAI_MODEL") {
        config.assist.model = model;
    }
    if let Ok(base_url) = env::var("CF_OPENAI_BASE_URL") {
        config.assist.base_url = Some(base_url);
    }

    if let Ok(filter) = env::var("CF_LOG_FILTER") {
        config.observability.log_filter = filter;
    }

    Ok(())
}

/// Loads configuration from environment variables alone, on top of defaults.
pub fn load_from_env() -> Result<AppConfig, ConfigError> {
    let mut config = AppConfig::default();
    apply_env(&mut config)?;
    Ok(config)
}
