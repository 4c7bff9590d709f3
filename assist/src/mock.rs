//! Canned assistant for tests.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use cf_core::traits::NoteAssistant;
use errors::AssistError;

#[derive(Default)]
struct MockState {
    title: Option<String>,
    summary: Option<String>,
    fail: Option<String>,
}

/// [`NoteAssistant`] with scripted responses. Without a scripted value it
/// derives a deterministic answer from the content, so tests that don't care
/// about the text still get something stable.
#[derive(Clone, Default)]
pub struct MockAssistant {
    state: Arc<RwLock<MockState>>,
}

impl MockAssistant {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_title(&self, title: &str) {
        self.state.write().await.title = Some(title.to_string());
    }

    pub async fn set_summary(&self, summary: &str) {
        self.state.write().await.summary = Some(summary.to_string());
    }

    /// Makes the next call fail with the given reason.
    pub async fn fail_next(&self, reason: &str) {
        self.state.write().await.fail = Some(reason.to_string());
    }

    async fn take_failure(&self) -> Result<(), AssistError> {
        if let Some(reason) = self.state.write().await.fail.take() {
            return Err(AssistError::Request { reason });
        }
        Ok(())
    }
}

#[async_trait]
impl NoteAssistant for MockAssistant {
    type Error = AssistError;

    async fn generate_title(&self, content: &str) -> Result<String, Self::Error> {
        self.take_failure().await?;
        if let Some(title) = self.state.read().await.title.clone() {
            return Ok(title);
        }
        let words: Vec<&str> = content.split_whitespace().take(5).collect();
        Ok(words.join(" "))
    }

    async fn summarize(&self, content: &str) -> Result<String, Self::Error> {
        self.take_failure().await?;
        if let Some(summary) = self.state.read().await.summary.clone() {
            return Ok(summary);
        }
        Ok(format!("Summary: {}", content.split_whitespace().take(8).collect::<Vec<_>>().join(" ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_title_wins_over_the_derived_one() {
        let mock = MockAssistant::new();
        assert_eq!(
            mock.generate_title("one two three four five six").await.unwrap(),
            "one two three four five"
        );
        mock.set_title("Scripted").await;
        assert_eq!(mock.generate_title("anything").await.unwrap(), "Scripted");
    }

    #[tokio::test]
    async fn failure_is_consumed_by_one_call() {
        let mock = MockAssistant::new();
        mock.fail_next("down").await;
        assert!(mock.generate_title("x").await.is_err());
        assert!(mock.generate_title("x").await.is_ok());
    }
}
