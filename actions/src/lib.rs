//! # Board Actions
//!
//! The server-side mutation endpoints: timeline creation, note
//! creation/publication, draft saves, board loading and the AI action
//! wrappers. All business rules live here: numbering, status transitions,
//! validation, hydration. Collaborators are injected so tests run against
//! the in-memory store and a canned assistant.
//!
//! Every endpoint catches its collaborators' failures at the boundary and
//! converts them to a structured [`errors::ActionError`]; the underlying
//! cause is logged, never surfaced to the caller.

use std::sync::Arc;

use cf_core::traits::{CacheInvalidator, DocumentStore, NoopInvalidator, NoteAssistant};
use errors::{AssistError, StorageError};

mod assist;
mod board;
mod input;
mod note;
mod timeline;

pub use input::{DraftInput, NoteInput};

/// Generic user-facing failure messages. The underlying errors carry more
/// detail; these are the only strings that cross the endpoint boundary.
pub mod messages {
    pub const FAILED_ADD_TIMELINE: &str =
        "Failed to add timeline. Check storage configuration and permissions.";
    pub const FAILED_ADD_NOTE: &str =
        "Failed to add note. Check storage configuration and permissions.";
    pub const FAILED_SAVE_DRAFT: &str = "Failed to save draft.";
    pub const FAILED_GENERATE_TITLE: &str = "Failed to generate title.";
    pub const FAILED_SUMMARIZE_NOTE: &str = "Failed to summarize note.";
    pub const CONTENT_EMPTY: &str = "Content is empty.";
    pub const TITLE_REQUIRED: &str = "Title is required.";
    pub const CONTENT_REQUIRED: &str = "Content is required.";
    pub const LINE_REQUIRED: &str = "Timeline selection is required.";
    pub const LINE_UNKNOWN: &str = "Unknown timeline.";
}

/// Title stored for a draft saved without one.
pub const DRAFT_PLACEHOLDER_TITLE: &str = "Untitled";

/// Path invalidated after every successful write.
pub(crate) const BOARD_PATH: &str = "/";

pub type SharedStore = Arc<dyn DocumentStore<Error = StorageError> + Send + Sync>;
pub type SharedAssistant = Arc<dyn NoteAssistant<Error = AssistError> + Send + Sync>;
pub type SharedInvalidator = Arc<dyn CacheInvalidator + Send + Sync>;

/// The endpoint set, with its collaborators injected.
#[derive(Clone)]
pub struct Actions {
    store: SharedStore,
    assistant: SharedAssistant,
    invalidator: SharedInvalidator,
}

impl Actions {
    pub fn new(store: SharedStore, assistant: SharedAssistant) -> Self {
        Self {
            store,
            assistant,
            invalidator: Arc::new(NoopInvalidator),
        }
    }

    #[must_use]
    pub fn with_invalidator(mut self, invalidator: SharedInvalidator) -> Self {
        self.invalidator = invalidator;
        self
    }

    pub(crate) fn store(&self) -> &SharedStore {
        &self.store
    }

    pub(crate) fn assistant(&self) -> &SharedAssistant {
        &self.assistant
    }

    pub(crate) async fn invalidate_board(&self) {
        self.invalidator.invalidate(BOARD_PATH).await;
    }
}
