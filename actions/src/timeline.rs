//! Timeline creation.

use cf_core::document::{
    Collection, Direction, DocumentQuery, DocumentWrite, WriteValue, counters, fields,
};
use cf_core::traits::DocumentStore;
use cf_core::types::{Timeline, TimelineView};
use errors::{ActionError, ActionResult, StorageError};

use crate::{Actions, messages};

impl Actions {
    /// Creates the next timeline. Takes no user input: the lane number is
    /// allocated server-side as `max(existing numbers) + 1`, starting at 1.
    ///
    /// The current highest number (descending query, first row) only seeds
    /// the counter floor; uniqueness under concurrent callers comes from the
    /// gateway's atomic [`allocate`](cf_core::DocumentStore::allocate), not
    /// from the read.
    #[tracing::instrument(skip(self))]
    pub async fn add_timeline(&self) -> ActionResult<TimelineView> {
        match self.add_timeline_inner().await {
            Ok(view) => {
                tracing::info!(number = view.number, id = %view.id, "timeline added");
                self.invalidate_board().await;
                Ok(view)
            }
            Err(err) => {
                tracing::error!(error = %err, "Error adding timeline");
                Err(ActionError::rejected(messages::FAILED_ADD_TIMELINE))
            }
        }
    }

    async fn add_timeline_inner(&self) -> Result<TimelineView, StorageError> {
        let highest = self
            .store()
            .query(
                Collection::Timelines,
                DocumentQuery::new()
                    .order_by(fields::NUMBER, Direction::Descending)
                    .limit(1),
            )
            .await?;
        let floor = highest
            .first()
            .and_then(|doc| doc.int(fields::NUMBER))
            .unwrap_or(0);

        let number = self
            .store()
            .allocate(counters::TIMELINE_NUMBER, floor)
            .await?;

        let id = self
            .store()
            .create(
                Collection::Timelines,
                DocumentWrite::new()
                    .with(fields::NUMBER, WriteValue::Int(number))
                    .with(fields::CREATED_AT, WriteValue::ServerTime),
            )
            .await?;

        // Read back so the view carries the server-resolved timestamp.
        let doc = self
            .store()
            .read(Collection::Timelines, &id)
            .await?
            .ok_or_else(|| StorageError::NotFound {
                collection: Collection::Timelines.as_str().to_string(),
                id: id.clone(),
            })?;
        Ok(Timeline::from_document(&doc)?.hydrate())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assist::MockAssistant;
    use storage::MemoryStore;

    use super::*;
    use crate::Actions;

    fn actions(store: &MemoryStore) -> Actions {
        Actions::new(Arc::new(store.clone()), Arc::new(MockAssistant::new()))
    }

    #[tokio::test]
    async fn sequential_adds_number_one_through_n() {
        let store = MemoryStore::new();
        let actions = actions(&store);
        let mut numbers = Vec::new();
        for _ in 0..5 {
            numbers.push(actions.add_timeline().await.unwrap().number);
        }
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn numbering_continues_after_existing_lanes() {
        let store = MemoryStore::new();
        let actions = actions(&store);
        // Lanes 1 and 2 predate the counter document.
        for number in [1, 2] {
            store
                .create(
                    Collection::Timelines,
                    DocumentWrite::new()
                        .with(fields::NUMBER, WriteValue::Int(number))
                        .with(fields::CREATED_AT, WriteValue::ServerTime),
                )
                .await
                .unwrap();
        }

        let view = actions.add_timeline().await.unwrap();
        assert_eq!(view.number, 3);
    }

    #[tokio::test]
    async fn concurrent_adds_never_collide() {
        let store = MemoryStore::new();
        let mut handles = Vec::new();
        for _ in 0..8 {
            let actions = actions(&store);
            handles.push(tokio::spawn(async move {
                actions.add_timeline().await.unwrap().number
            }));
        }
        let mut numbers = Vec::new();
        for handle in handles {
            numbers.push(handle.await.unwrap());
        }
        numbers.sort_unstable();
        assert_eq!(numbers, (1..=8).collect::<Vec<i64>>());
    }

    #[tokio::test]
    async fn persistence_failure_becomes_the_generic_rejection() {
        let store = MemoryStore::new();
        let actions = actions(&store);
        store.fail_next_write("simulated outage").await;

        let err = actions.add_timeline().await.unwrap_err();
        assert_eq!(
            err,
            ActionError::rejected(messages::FAILED_ADD_TIMELINE)
        );
        // The failed write left nothing behind.
        assert!(store.is_empty(Collection::Timelines).await);
    }

    #[tokio::test]
    async fn returned_view_is_hydrated() {
        let store = MemoryStore::new();
        let view = actions(&store).add_timeline().await.unwrap();
        assert!(!view.id.is_empty());
        // ISO-8601 string, parseable back to an instant.
        assert!(chrono::DateTime::parse_from_rfc3339(&view.created_at).is_ok());
    }
}
