//! Note creation, publication and draft saves.

use cf_core::document::{Collection, DocumentWrite, WriteValue, fields};
use cf_core::traits::DocumentStore;
use cf_core::types::{DraftSaved, Note, NoteStatus, NoteView};
use errors::{ActionError, ActionResult, StorageError};
use validator::Validate;

use crate::input::{DraftInput, NoteInput, unknown_timeline, validation_error};
use crate::{Actions, DRAFT_PLACEHOLDER_TITLE, messages};

impl Actions {
    /// Creates a published note, or promotes an existing draft when
    /// `draft_id` is given. Promotion updates the draft document in place:
    /// same id, fields overwritten, status flipped to published, and the
    /// creation timestamp reassigned to the promotion instant.
    #[tracing::instrument(skip(self, input))]
    pub async fn add_note(&self, input: NoteInput) -> ActionResult<NoteView> {
        if let Err(errors) = input.validate() {
            return Err(validation_error(&errors));
        }
        match self.timeline_exists(&input.line_id).await {
            Ok(true) => {}
            Ok(false) => return Err(unknown_timeline()),
            Err(err) => {
                tracing::error!(error = %err, "Error resolving timeline reference");
                return Err(ActionError::rejected(messages::FAILED_ADD_NOTE));
            }
        }

        match self.add_note_inner(&input).await {
            Ok(view) => {
                tracing::info!(id = %view.id, line_id = %view.line_id, "note published");
                self.invalidate_board().await;
                Ok(view)
            }
            Err(err) => {
                tracing::error!(error = %err, "Error adding note");
                Err(ActionError::rejected(messages::FAILED_ADD_NOTE))
            }
        }
    }

    async fn add_note_inner(&self, input: &NoteInput) -> Result<NoteView, StorageError> {
        let write = DocumentWrite::new()
            .with(fields::TITLE, WriteValue::str(input.title.clone()))
            .with(fields::CONTENT, WriteValue::str(input.content.clone()))
            .with(fields::LINE_ID, WriteValue::str(input.line_id.clone()))
            .with(fields::STATUS, WriteValue::str(NoteStatus::Published.as_str()))
            .with(fields::CREATED_AT, WriteValue::ServerTime);

        let id = match &input.draft_id {
            Some(draft_id) => {
                self.store()
                    .update(Collection::Notes, draft_id, write)
                    .await?;
                draft_id.clone()
            }
            None => self.store().create(Collection::Notes, write).await?,
        };

        let doc = self
            .store()
            .read(Collection::Notes, &id)
            .await?
            .ok_or_else(|| StorageError::NotFound {
                collection: Collection::Notes.as_str().to_string(),
                id: id.clone(),
            })?;
        Ok(Note::from_document(&doc)?.hydrate())
    }

    /// Saves a draft. Drafts may be incomplete: an absent title is stored as
    /// a placeholder on first save. With `draft_id` the existing document is
    /// updated in place (saving identical fields twice changes nothing);
    /// without it a new draft document is created.
    #[tracing::instrument(skip(self, input))]
    pub async fn save_draft(&self, input: DraftInput) -> ActionResult<DraftSaved> {
        if let Err(errors) = input.validate() {
            return Err(validation_error(&errors));
        }
        match self.timeline_exists(&input.line_id).await {
            Ok(true) => {}
            Ok(false) => return Err(unknown_timeline()),
            Err(err) => {
                tracing::error!(error = %err, "Error resolving timeline reference");
                return Err(ActionError::rejected(messages::FAILED_SAVE_DRAFT));
            }
        }

        match self.save_draft_inner(&input).await {
            Ok(saved) => {
                tracing::info!(draft_id = %saved.draft_id, "draft saved");
                self.invalidate_board().await;
                Ok(saved)
            }
            Err(err) => {
                tracing::error!(error = %err, "Error saving draft");
                Err(ActionError::rejected(messages::FAILED_SAVE_DRAFT))
            }
        }
    }

    async fn save_draft_inner(&self, input: &DraftInput) -> Result<DraftSaved, StorageError> {
        match &input.draft_id {
            Some(draft_id) => {
                let write = DocumentWrite::new()
                    .with(fields::TITLE, WriteValue::str(input.title.clone()))
                    .with(fields::CONTENT, WriteValue::str(input.content.clone()))
                    .with(fields::LINE_ID, WriteValue::str(input.line_id.clone()));
                self.store()
                    .update(Collection::Notes, draft_id, write)
                    .await?;
                Ok(DraftSaved {
                    draft_id: draft_id.clone(),
                })
            }
            None => {
                let title = if input.title.is_empty() {
                    DRAFT_PLACEHOLDER_TITLE
                } else {
                    &input.title
                };
                let write = DocumentWrite::new()
                    .with(fields::TITLE, WriteValue::str(title))
                    .with(fields::CONTENT, WriteValue::str(input.content.clone()))
                    .with(fields::LINE_ID, WriteValue::str(input.line_id.clone()))
                    .with(fields::STATUS, WriteValue::str(NoteStatus::Draft.as_str()))
                    .with(fields::CREATED_AT, WriteValue::ServerTime);
                let draft_id = self.store().create(Collection::Notes, write).await?;
                Ok(DraftSaved { draft_id })
            }
        }
    }

    /// Notes must reference an existing timeline at creation; there is no
    /// cascade or orphan repair anywhere downstream.
    async fn timeline_exists(&self, line_id: &str) -> Result<bool, StorageError> {
        let doc = self.store().read(Collection::Timelines, line_id).await?;
        Ok(doc.is_some())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assist::MockAssistant;
    use storage::MemoryStore;

    use super::*;
    use crate::Actions;

    async fn board_with_lane(store: &MemoryStore) -> (Actions, String) {
        let actions = Actions::new(Arc::new(store.clone()), Arc::new(MockAssistant::new()));
        let lane = actions.add_timeline().await.unwrap();
        (actions, lane.id)
    }

    fn note_input(line_id: &str) -> NoteInput {
        NoteInput {
            title: "T".to_string(),
            content: "C".to_string(),
            line_id: line_id.to_string(),
            draft_id: None,
        }
    }

    #[tokio::test]
    async fn add_note_creates_a_published_note() {
        let store = MemoryStore::new();
        let (actions, lane) = board_with_lane(&store).await;

        let view = actions.add_note(note_input(&lane)).await.unwrap();
        assert_eq!(view.status, NoteStatus::Published);
        assert_eq!(view.line_id, lane);
        assert!(!view.id.is_empty());
    }

    #[tokio::test]
    async fn add_note_without_draft_mints_a_fresh_id() {
        let store = MemoryStore::new();
        let (actions, lane) = board_with_lane(&store).await;

        let first = actions.add_note(note_input(&lane)).await.unwrap();
        let second = actions.add_note(note_input(&lane)).await.unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn empty_fields_fail_validation_without_touching_storage() {
        let store = MemoryStore::new();
        let (actions, lane) = board_with_lane(&store).await;

        let err = actions
            .add_note(NoteInput {
                title: String::new(),
                content: "x".to_string(),
                line_id: lane,
                draft_id: None,
            })
            .await
            .unwrap_err();

        match err {
            ActionError::Validation { fields } => {
                assert_eq!(fields.messages("title"), ["Title is required."]);
                assert!(!fields.contains("content"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(store.is_empty(Collection::Notes).await);
    }

    #[tokio::test]
    async fn unknown_timeline_is_a_line_id_field_error() {
        let store = MemoryStore::new();
        let actions = Actions::new(Arc::new(store.clone()), Arc::new(MockAssistant::new()));

        let err = actions.add_note(note_input("missing")).await.unwrap_err();
        assert_eq!(err, ActionError::field("lineId", messages::LINE_UNKNOWN));
        assert!(store.is_empty(Collection::Notes).await);
    }

    #[tokio::test]
    async fn promoting_a_draft_keeps_its_id_and_flips_status() {
        let store = MemoryStore::new();
        let (actions, lane) = board_with_lane(&store).await;

        let saved = actions
            .save_draft(DraftInput {
                title: "draft title".to_string(),
                content: "draft body".to_string(),
                line_id: lane.clone(),
                draft_id: None,
            })
            .await
            .unwrap();

        let view = actions
            .add_note(NoteInput {
                title: "Final".to_string(),
                content: "Body".to_string(),
                line_id: lane,
                draft_id: Some(saved.draft_id.clone()),
            })
            .await
            .unwrap();

        assert_eq!(view.id, saved.draft_id);
        assert_eq!(view.status, NoteStatus::Published);
        assert_eq!(view.title, "Final");
        assert_eq!(store.len(Collection::Notes).await, 1);
    }

    #[tokio::test]
    async fn promotion_reassigns_the_creation_timestamp() {
        let store = MemoryStore::new();
        let (actions, lane) = board_with_lane(&store).await;

        let saved = actions
            .save_draft(DraftInput {
                title: "d".to_string(),
                content: "c".to_string(),
                line_id: lane.clone(),
                draft_id: None,
            })
            .await
            .unwrap();
        let drafted = store
            .read(Collection::Notes, &saved.draft_id)
            .await
            .unwrap()
            .unwrap()
            .time(fields::CREATED_AT)
            .unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        actions
            .add_note(NoteInput {
                title: "T".to_string(),
                content: "C".to_string(),
                line_id: lane,
                draft_id: Some(saved.draft_id.clone()),
            })
            .await
            .unwrap();
        let published = store
            .read(Collection::Notes, &saved.draft_id)
            .await
            .unwrap()
            .unwrap()
            .time(fields::CREATED_AT)
            .unwrap();

        assert!(published > drafted);
    }

    #[tokio::test]
    async fn empty_draft_gets_the_placeholder_title() {
        let store = MemoryStore::new();
        let (actions, lane) = board_with_lane(&store).await;

        let saved = actions
            .save_draft(DraftInput {
                line_id: lane,
                ..DraftInput::default()
            })
            .await
            .unwrap();

        let doc = store
            .read(Collection::Notes, &saved.draft_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.str(fields::TITLE), Some(DRAFT_PLACEHOLDER_TITLE));
        assert_eq!(doc.str(fields::STATUS), Some("draft"));
    }

    #[tokio::test]
    async fn saving_the_same_draft_twice_is_idempotent() {
        let store = MemoryStore::new();
        let (actions, lane) = board_with_lane(&store).await;

        let input = DraftInput {
            title: "t".to_string(),
            content: "c".to_string(),
            line_id: lane,
            draft_id: None,
        };
        let saved = actions.save_draft(input.clone()).await.unwrap();

        let again = actions
            .save_draft(DraftInput {
                draft_id: Some(saved.draft_id.clone()),
                ..input
            })
            .await
            .unwrap();

        assert_eq!(again.draft_id, saved.draft_id);
        assert_eq!(store.len(Collection::Notes).await, 1);
        let doc = store
            .read(Collection::Notes, &saved.draft_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.str(fields::TITLE), Some("t"));
        assert_eq!(doc.str(fields::CONTENT), Some("c"));
    }

    #[tokio::test]
    async fn persistence_failure_becomes_the_generic_rejection() {
        let store = MemoryStore::new();
        let (actions, lane) = board_with_lane(&store).await;
        store.fail_next_write("simulated outage").await;

        let err = actions.add_note(note_input(&lane)).await.unwrap_err();
        assert_eq!(err, ActionError::rejected(messages::FAILED_ADD_NOTE));
        assert!(store.is_empty(Collection::Notes).await);
    }
}
