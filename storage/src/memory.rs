//! In-memory document store.
//!
//! The authoritative fake: ids, server timestamps and counter allocation all
//! behave like a hosted backend, so endpoint and reconciliation tests run
//! against the same semantics the Firestore backend provides. Also used as
//! the storage backend in single-process deployments.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use cf_core::document::{Collection, Document, DocumentQuery, DocumentWrite};
use cf_core::traits::DocumentStore;
use errors::StorageError;

const BACKEND: &str = "memory";

#[derive(Default)]
struct Shelves {
    collections: HashMap<Collection, BTreeMap<String, Document>>,
    counters: HashMap<String, i64>,
}

/// In-memory [`DocumentStore`]. Cheap to clone; clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    shelves: Arc<RwLock<Shelves>>,
    fail_next: Arc<Mutex<Option<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next write (create, update or allocate) fail with the given
    /// reason. Reads are unaffected. Used by rollback tests.
    pub async fn fail_next_write(&self, reason: &str) {
        *self.fail_next.lock().await = Some(reason.to_string());
    }

    async fn take_injected_failure(&self) -> Result<(), StorageError> {
        if let Some(reason) = self.fail_next.lock().await.take() {
            tracing::warn!(%reason, "injected write failure");
            return Err(StorageError::WriteRejected {
                backend: BACKEND.to_string(),
                reason,
            });
        }
        Ok(())
    }

    /// Number of documents currently held in a collection.
    pub async fn len(&self, collection: Collection) -> usize {
        let shelves = self.shelves.read().await;
        shelves
            .collections
            .get(&collection)
            .map_or(0, BTreeMap::len)
    }

    pub async fn is_empty(&self, collection: Collection) -> bool {
        self.len(collection).await == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    type Error = StorageError;

    async fn create(
        &self,
        collection: Collection,
        write: DocumentWrite,
    ) -> Result<String, Self::Error> {
        self.take_injected_failure().await?;
        let id = Uuid::new_v4().simple().to_string();
        let doc = Document::resolve(collection, id.clone(), write, Utc::now());
        let mut shelves = self.shelves.write().await;
        shelves
            .collections
            .entry(collection)
            .or_default()
            .insert(id.clone(), doc);
        Ok(id)
    }

    async fn read(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<Document>, Self::Error> {
        let shelves = self.shelves.read().await;
        Ok(shelves
            .collections
            .get(&collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        write: DocumentWrite,
    ) -> Result<(), Self::Error> {
        self.take_injected_failure().await?;
        let mut shelves = self.shelves.write().await;
        let doc = shelves
            .collections
            .get_mut(&collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StorageError::NotFound {
                collection: collection.as_str().to_string(),
                id: id.to_string(),
            })?;
        doc.apply(write, Utc::now());
        Ok(())
    }

    async fn query(
        &self,
        collection: Collection,
        query: DocumentQuery,
    ) -> Result<Vec<Document>, Self::Error> {
        let shelves = self.shelves.read().await;
        let mut docs: Vec<Document> = shelves
            .collections
            .get(&collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default();

        if let Some(filter) = &query.filter {
            docs.retain(|doc| doc.get(&filter.field) == Some(&filter.value));
        }

        if let Some(order) = &query.order_by {
            docs.sort_by(|a, b| {
                let ordering = match (a.get(&order.field), b.get(&order.field)) {
                    (Some(left), Some(right)) => left.sort_cmp(right),
                    // Documents missing the ordered field sort first, which is
                    // how the hosted backend orders missing fields.
                    (None, Some(_)) => std::cmp::Ordering::Less,
                    (Some(_), None) => std::cmp::Ordering::Greater,
                    (None, None) => std::cmp::Ordering::Equal,
                };
                match order.direction {
                    cf_core::Direction::Ascending => ordering,
                    cf_core::Direction::Descending => ordering.reverse(),
                }
            });
        }

        if let Some(limit) = query.limit {
            docs.truncate(limit);
        }

        Ok(docs)
    }

    async fn allocate(&self, counter: &str, floor: i64) -> Result<i64, Self::Error> {
        self.take_injected_failure().await?;
        let mut shelves = self.shelves.write().await;
        let value = shelves.counters.entry(counter.to_string()).or_insert(0);
        *value = (*value).max(floor) + 1;
        Ok(*value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cf_core::document::{Direction, WriteValue, fields};

    #[tokio::test]
    async fn create_assigns_distinct_ids_and_resolves_server_time() {
        let store = MemoryStore::new();
        let write = DocumentWrite::new()
            .with(fields::NUMBER, WriteValue::Int(1))
            .with(fields::CREATED_AT, WriteValue::ServerTime);
        let a = store.create(Collection::Timelines, write.clone()).await.unwrap();
        let b = store.create(Collection::Timelines, write).await.unwrap();
        assert_ne!(a, b);

        let doc = store.read(Collection::Timelines, &a).await.unwrap().unwrap();
        assert!(doc.time(fields::CREATED_AT).is_some());
    }

    #[tokio::test]
    async fn update_merges_fields_and_requires_existence() {
        let store = MemoryStore::new();
        let id = store
            .create(
                Collection::Notes,
                DocumentWrite::new()
                    .with(fields::TITLE, WriteValue::str("old"))
                    .with(fields::CONTENT, WriteValue::str("body")),
            )
            .await
            .unwrap();

        store
            .update(
                Collection::Notes,
                &id,
                DocumentWrite::new().with(fields::TITLE, WriteValue::str("new")),
            )
            .await
            .unwrap();

        let doc = store.read(Collection::Notes, &id).await.unwrap().unwrap();
        assert_eq!(doc.str(fields::TITLE), Some("new"));
        assert_eq!(doc.str(fields::CONTENT), Some("body"));

        let missing = store
            .update(
                Collection::Notes,
                "absent",
                DocumentWrite::new().with(fields::TITLE, WriteValue::str("x")),
            )
            .await;
        assert!(matches!(missing, Err(StorageError::NotFound { .. })));
    }

    #[tokio::test]
    async fn query_filters_orders_and_limits() {
        let store = MemoryStore::new();
        for (number, line) in [(2, "a"), (1, "a"), (3, "b")] {
            store
                .create(
                    Collection::Notes,
                    DocumentWrite::new()
                        .with(fields::NUMBER, WriteValue::Int(number))
                        .with(fields::LINE_ID, WriteValue::str(line)),
                )
                .await
                .unwrap();
        }

        let docs = store
            .query(
                Collection::Notes,
                DocumentQuery::new()
                    .filter_eq(fields::LINE_ID, "a")
                    .order_by(fields::NUMBER, Direction::Descending),
            )
            .await
            .unwrap();
        let numbers: Vec<i64> = docs.iter().filter_map(|d| d.int(fields::NUMBER)).collect();
        assert_eq!(numbers, vec![2, 1]);

        let limited = store
            .query(
                Collection::Notes,
                DocumentQuery::new()
                    .order_by(fields::NUMBER, Direction::Ascending)
                    .limit(1),
            )
            .await
            .unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].int(fields::NUMBER), Some(1));
    }

    #[tokio::test]
    async fn allocate_is_monotonic_and_respects_floor() {
        let store = MemoryStore::new();
        assert_eq!(store.allocate("timelineNumber", 0).await.unwrap(), 1);
        assert_eq!(store.allocate("timelineNumber", 0).await.unwrap(), 2);
        // A floor above the counter raises it before incrementing.
        assert_eq!(store.allocate("timelineNumber", 7).await.unwrap(), 8);
        // A stale floor never rolls the counter back.
        assert_eq!(store.allocate("timelineNumber", 2).await.unwrap(), 9);
    }

    #[tokio::test]
    async fn allocate_under_concurrency_yields_distinct_values() {
        let store = MemoryStore::new();
        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(
                async move { store.allocate("n", 0).await.unwrap() },
            ));
        }
        let mut values = Vec::new();
        for handle in handles {
            values.push(handle.await.unwrap());
        }
        values.sort_unstable();
        values.dedup();
        assert_eq!(values.len(), 16);
    }

    #[tokio::test]
    async fn injected_failure_hits_exactly_one_write() {
        let store = MemoryStore::new();
        store.fail_next_write("simulated outage").await;
        let err = store
            .create(Collection::Timelines, DocumentWrite::new())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::WriteRejected { .. }));

        // The failure is consumed; the next write goes through.
        store
            .create(Collection::Timelines, DocumentWrite::new())
            .await
            .unwrap();
        assert_eq!(store.len(Collection::Timelines).await, 1);
    }
}
