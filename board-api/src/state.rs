//! Application state for the board API.

use std::sync::Arc;

use actions::Actions;
use assist::{MockAssistant, OpenAiAssistant, OpenAiConfig};
use config::{AppConfig, AssistProviderKind, StorageBackendKind};
use storage::{FirestoreConfig, FirestoreStore, MemoryStore};

use crate::cache::SnapshotCache;
use crate::error::{Result, ServerError};

/// Shared application state for Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub actions: Actions,
    pub cache: Arc<SnapshotCache>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Builds the state from configuration: picks the storage backend and
    /// assistant provider, and wires the board cache in as the revalidation
    /// target.
    pub fn new(config: AppConfig) -> Result<Self> {
        let store: actions::SharedStore = match config.storage.backend {
            StorageBackendKind::Memory => Arc::new(MemoryStore::new()),
            StorageBackendKind::Firestore => {
                let settings = &config.storage.firestore;
                let mut firestore_config = FirestoreConfig::new(settings.project_id.clone());
                if !settings.database_id.is_empty() {
                    firestore_config.database_id = settings.database_id.clone();
                }
                if let Some(base_url) = &settings.base_url {
                    firestore_config = firestore_config.with_base_url(base_url.clone());
                }
                if let Some(token) = &settings.bearer_token {
                    firestore_config = firestore_config.with_bearer_token(token.clone());
                }
                Arc::new(
                    FirestoreStore::new(firestore_config)
                        .map_err(|e| ServerError::Storage(e.to_string()))?,
                )
            }
        };

        let assistant: actions::SharedAssistant = match config.assist.provider {
            AssistProviderKind::Mock => Arc::new(MockAssistant::new()),
            AssistProviderKind::Openai => {
                let mut openai_config =
                    OpenAiConfig::new(config.assist.api_key.clone(), config.assist.model.clone());
                if let Some(base_url) = &config.assist.base_url {
                    openai_config = openai_config.with_base_url(base_url.clone());
                }
                Arc::new(
                    OpenAiAssistant::new(openai_config)
                        .map_err(|e| ServerError::Configuration(e.to_string()))?,
                )
            }
        };

        let cache = Arc::new(SnapshotCache::new());
        let actions = Actions::new(store, assistant).with_invalidator(cache.clone());

        Ok(Self {
            actions,
            cache,
            config: Arc::new(config),
        })
    }

    /// State over explicit collaborators (used by tests).
    pub fn with_actions(actions: Actions, cache: Arc<SnapshotCache>, config: AppConfig) -> Self {
        Self {
            actions,
            cache,
            config: Arc::new(config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_builds_the_in_memory_state() {
        let state = AppState::new(AppConfig::default()).unwrap();
        assert_eq!(state.config.server.port, 8080);
    }

    #[test]
    fn firestore_backend_is_constructed_from_settings() {
        let mut config = AppConfig::default();
        config.storage.backend = StorageBackendKind::Firestore;
        config.storage.firestore.project_id = "demo".to_string();
        config.storage.firestore.base_url = Some("http://localhost:8200/v1".to_string());
        assert!(AppState::new(config).is_ok());
    }
}
