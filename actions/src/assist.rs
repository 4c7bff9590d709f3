//! AI action wrappers.
//!
//! Thin boundaries over the injected [`cf_core::NoteAssistant`]: blank input
//! is rejected before the model is called, and model failures collapse to the
//! one generic message each action may show.

use cf_core::traits::NoteAssistant;
use errors::{ActionError, ActionResult};

use crate::{Actions, messages};

impl Actions {
    /// Suggests a title for the given note content. The suggestion is only
    /// ever a suggestion; the user confirms it before any save.
    #[tracing::instrument(skip(self, content))]
    pub async fn suggest_title(&self, content: &str) -> ActionResult<String> {
        if content.trim().is_empty() {
            return Err(ActionError::rejected(messages::CONTENT_EMPTY));
        }
        match self.assistant().generate_title(content).await {
            Ok(title) => Ok(title),
            Err(err) => {
                tracing::error!(error = %err, "Error generating title");
                Err(ActionError::rejected(messages::FAILED_GENERATE_TITLE))
            }
        }
    }

    /// Summarizes the given note content.
    #[tracing::instrument(skip(self, content))]
    pub async fn summarize_note(&self, content: &str) -> ActionResult<String> {
        if content.trim().is_empty() {
            return Err(ActionError::rejected(messages::CONTENT_EMPTY));
        }
        match self.assistant().summarize(content).await {
            Ok(summary) => Ok(summary),
            Err(err) => {
                tracing::error!(error = %err, "Error summarizing note");
                Err(ActionError::rejected(messages::FAILED_SUMMARIZE_NOTE))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use assist::MockAssistant;
    use storage::MemoryStore;

    use super::*;
    use crate::Actions;

    fn actions_with(assistant: MockAssistant) -> Actions {
        Actions::new(Arc::new(MemoryStore::new()), Arc::new(assistant))
    }

    #[tokio::test]
    async fn blank_content_is_rejected_without_calling_the_model() {
        let actions = actions_with(MockAssistant::new());
        let err = actions.suggest_title("   ").await.unwrap_err();
        assert_eq!(err, ActionError::rejected(messages::CONTENT_EMPTY));
    }

    #[tokio::test]
    async fn suggestion_passes_the_model_title_through() {
        let assistant = MockAssistant::new();
        assistant.set_title("Grocery run plan").await;
        let actions = actions_with(assistant);
        let title = actions.suggest_title("milk, eggs, flour").await.unwrap();
        assert_eq!(title, "Grocery run plan");
    }

    #[tokio::test]
    async fn model_failure_collapses_to_the_generic_message() {
        let assistant = MockAssistant::new();
        assistant.fail_next("model overloaded").await;
        let actions = actions_with(assistant);
        let err = actions.suggest_title("some content").await.unwrap_err();
        assert_eq!(
            err,
            ActionError::rejected(messages::FAILED_GENERATE_TITLE)
        );
    }

    #[tokio::test]
    async fn summarize_uses_its_own_generic_message() {
        let assistant = MockAssistant::new();
        assistant.fail_next("model overloaded").await;
        let actions = actions_with(assistant);
        let err = actions.summarize_note("some content").await.unwrap_err();
        assert_eq!(
            err,
            ActionError::rejected(messages::FAILED_SUMMARIZE_NOTE)
        );
    }
}
