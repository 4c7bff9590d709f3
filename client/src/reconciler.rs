//! Async reconciliation driver.
//!
//! One `Board` per rendered page: it owns the local state and the endpoint
//! handle, and runs each mutation through the optimistic protocol: stage,
//! await the endpoint, then confirm or roll back. Multiple mutations may be
//! in flight at once; the pending table keeps their resolutions apart.

use std::sync::Arc;

use tokio::sync::RwLock;

use actions::{Actions, DraftInput, NoteInput};
use cf_core::types::{BoardSnapshot, DraftSaved, NoteView, TimelineView};
use errors::{ActionError, ActionResult};

use crate::board::BoardState;
use crate::pending::ReconcileError;

#[derive(Clone)]
pub struct Board {
    actions: Arc<Actions>,
    state: Arc<RwLock<BoardState>>,
}

impl Board {
    pub fn new(actions: Arc<Actions>) -> Self {
        Self {
            actions,
            state: Arc::new(RwLock::new(BoardState::new())),
        }
    }

    /// The board as currently rendered, optimistic entries included.
    pub async fn snapshot(&self) -> BoardSnapshot {
        self.state.read().await.snapshot()
    }

    pub async fn pending_count(&self) -> usize {
        self.state.read().await.pending_count()
    }

    /// Page-level refetch: adopts the authoritative snapshot wholesale,
    /// discarding unresolved optimistic entries.
    pub async fn refresh(&self) -> BoardSnapshot {
        let snapshot = self.actions.load_board().await;
        self.state.write().await.replace_snapshot(snapshot.clone());
        snapshot
    }

    /// Adds a timeline through the optimistic protocol: the provisional lane
    /// appears immediately, then is substituted by the confirmed one or
    /// removed again on failure.
    pub async fn add_timeline(&self) -> ActionResult<TimelineView> {
        let staged = self.stage_timeline().await?;
        match self.actions.add_timeline().await {
            Ok(confirmed) => {
                let mut state = self.state.write().await;
                log_late_resolution(state.confirm_timeline(&staged.id, confirmed.clone()));
                Ok(confirmed)
            }
            Err(err) => {
                let mut state = self.state.write().await;
                log_late_resolution(state.rollback_timeline(&staged.id));
                Err(err)
            }
        }
    }

    /// Adds (or promotes) a note through the optimistic protocol.
    pub async fn add_note(&self, input: NoteInput) -> ActionResult<NoteView> {
        let staged = self.stage_note(&input).await?;
        match self.actions.add_note(input).await {
            Ok(confirmed) => {
                let mut state = self.state.write().await;
                log_late_resolution(state.confirm_note(&staged.id, confirmed.clone()));
                Ok(confirmed)
            }
            Err(err) => {
                let mut state = self.state.write().await;
                log_late_resolution(state.rollback_note(&staged.id));
                Err(err)
            }
        }
    }

    /// Drafts are saved without optimistic staging: they are not rendered in
    /// the published board, so there is nothing to reconcile.
    pub async fn save_draft(&self, input: DraftInput) -> ActionResult<DraftSaved> {
        self.actions.save_draft(input).await
    }

    pub async fn suggest_title(&self, content: &str) -> ActionResult<String> {
        self.actions.suggest_title(content).await
    }

    pub async fn summarize_note(&self, content: &str) -> ActionResult<String> {
        self.actions.summarize_note(content).await
    }

    async fn stage_timeline(&self) -> ActionResult<TimelineView> {
        let mut state = self.state.write().await;
        state.stage_timeline().map_err(stage_failure)
    }

    async fn stage_note(&self, input: &NoteInput) -> ActionResult<NoteView> {
        let mut state = self.state.write().await;
        state
            .stage_note(&input.title, &input.content, &input.line_id)
            .map_err(stage_failure)
    }
}

/// Staging can only fail on a temporary-id collision, which minting rules
/// out; if it ever happens it is a bug worth a loud log, not a user message.
fn stage_failure(err: ReconcileError) -> ActionError {
    tracing::error!(error = %err, "failed to stage optimistic entity");
    ActionError::rejected(err.to_string())
}

/// A resolution that finds its entry gone lost a race with a snapshot
/// replace; the optimistic entry was already discarded and the confirmed
/// entity arrives with the next refetch.
fn log_late_resolution(result: Result<(), ReconcileError>) {
    match result {
        Ok(()) => {}
        Err(ReconcileError::NotPending { id }) => {
            tracing::debug!(%id, "resolution after snapshot replace; entry already discarded");
        }
        Err(err) => {
            tracing::warn!(error = %err, "unexpected reconciliation failure");
        }
    }
}
