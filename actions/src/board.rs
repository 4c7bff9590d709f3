//! Board loading.

use cf_core::document::{Collection, Direction, DocumentQuery, fields};
use cf_core::traits::DocumentStore;
use cf_core::types::{BoardSnapshot, Note, NoteView, Timeline, TimelineView};
use errors::StorageError;

use crate::Actions;

impl Actions {
    /// Loads the authoritative board: timelines in lane order, published
    /// notes in creation order. A failing read degrades to an empty
    /// collection; the board renders empty rather than erroring the page.
    #[tracing::instrument(skip(self))]
    pub async fn load_board(&self) -> BoardSnapshot {
        let timelines = match self.load_timelines().await {
            Ok(timelines) => timelines,
            Err(err) => {
                tracing::error!(error = %err, "Failed to fetch timelines");
                Vec::new()
            }
        };
        let notes = match self.load_published_notes().await {
            Ok(notes) => notes,
            Err(err) => {
                tracing::error!(error = %err, "Failed to fetch notes");
                Vec::new()
            }
        };
        BoardSnapshot { timelines, notes }
    }

    async fn load_timelines(&self) -> Result<Vec<TimelineView>, StorageError> {
        let docs = self
            .store()
            .query(
                Collection::Timelines,
                DocumentQuery::new().order_by(fields::NUMBER, Direction::Ascending),
            )
            .await?;
        docs.iter()
            .map(|doc| Timeline::from_document(doc).map(|t| t.hydrate()))
            .collect()
    }

    async fn load_published_notes(&self) -> Result<Vec<NoteView>, StorageError> {
        // Drafts are filtered after decoding: notes written before the draft
        // feature carry no status field and must keep showing up.
        let docs = self
            .store()
            .query(
                Collection::Notes,
                DocumentQuery::new().order_by(fields::CREATED_AT, Direction::Ascending),
            )
            .await?;
        let mut notes = Vec::with_capacity(docs.len());
        for doc in &docs {
            let note = Note::from_document(doc)?;
            if note.status.is_published() {
                notes.push(note.hydrate());
            }
        }
        Ok(notes)
    }

    /// Drafts attached to one timeline, oldest first.
    #[tracing::instrument(skip(self))]
    pub async fn load_drafts(&self, line_id: &str) -> Result<Vec<NoteView>, StorageError> {
        let docs = self
            .store()
            .query(
                Collection::Notes,
                DocumentQuery::new()
                    .filter_eq(fields::LINE_ID, line_id)
                    .order_by(fields::CREATED_AT, Direction::Ascending),
            )
            .await?;
        let mut drafts = Vec::new();
        for doc in &docs {
            let note = Note::from_document(doc)?;
            if !note.status.is_published() {
                drafts.push(note.hydrate());
            }
        }
        Ok(drafts)
    }
}
