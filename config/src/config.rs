//! Configuration structures.
//!
//! All structures use `serde` for (de)serialization and `validator` for
//! constraint checks; every section has sensible defaults so a bare process
//! boots against the in-memory store with the mock assistant.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use validator::{Validate, ValidationError};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = validate_backend_settings))]
pub struct AppConfig {
    #[serde(default)]
    #[validate(nested)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub assist: AssistConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    #[validate(length(min = 1))]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StorageBackendKind {
    #[default]
    Memory,
    Firestore,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackendKind,

    #[serde(default)]
    pub firestore: FirestoreSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FirestoreSettings {
    #[serde(default)]
    pub project_id: String,

    /// Empty means the project's default database.
    #[serde(default)]
    pub database_id: String,

    /// Override for the emulator or tests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_token: Option<String>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AssistProviderKind {
    #[default]
    Mock,
    Openai,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistConfig {
    #[serde(default)]
    pub provider: AssistProviderKind,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl Default for AssistConfig {
    fn default() -> Self {
        Self {
            provider: AssistProviderKind::default(),
            api_key: String::new(),
            model: default_model(),
            base_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log filter directive, `tracing_subscriber::EnvFilter` syntax.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
        }
    }
}

/// Backend selections pull in their own required settings.
fn validate_backend_settings(config: &AppConfig) -> Result<(), ValidationError> {
    if config.storage.backend == StorageBackendKind::Firestore
        && config.storage.firestore.project_id.is_empty()
    {
        return Err(ValidationError::new("firestore_project_id_required"));
    }
    if config.assist.provider == AssistProviderKind::Openai && config.assist.api_key.is_empty() {
        return Err(ValidationError::new("assist_api_key_required"));
    }
    Ok(())
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_log_filter() -> String {
    "info".to_string()
}
