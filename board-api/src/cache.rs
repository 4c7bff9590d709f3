//! Rendered-board cache and the revalidation signal.

use async_trait::async_trait;
use tokio::sync::RwLock;

use cf_core::traits::CacheInvalidator;
use cf_core::types::BoardSnapshot;

/// Holds the last served board snapshot. Mutation endpoints invalidate it
/// through [`CacheInvalidator`], so the next `/v1/board` read rebuilds from
/// the gateway.
#[derive(Default)]
pub struct SnapshotCache {
    inner: RwLock<Option<BoardSnapshot>>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self) -> Option<BoardSnapshot> {
        self.inner.read().await.clone()
    }

    pub async fn put(&self, snapshot: BoardSnapshot) {
        *self.inner.write().await = Some(snapshot);
    }

    pub async fn clear(&self) {
        *self.inner.write().await = None;
    }
}

#[async_trait]
impl CacheInvalidator for SnapshotCache {
    async fn invalidate(&self, path: &str) {
        tracing::debug!(%path, "board cache invalidated");
        self.clear().await;
    }
}
