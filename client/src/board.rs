//! Locally held board state.
//!
//! The collections the UI renders from, mutated optimistically before the
//! server has confirmed anything. All staging and resolution goes through
//! the pending table, so every provisional entity is resolved exactly once.

use chrono::Utc;

use cf_core::types::{BoardSnapshot, NoteStatus, NoteView, TimelineView};

use crate::pending::{MutationKind, PendingMutations, ReconcileError, mint_local_id};

#[derive(Debug, Default)]
pub struct BoardState {
    timelines: Vec<TimelineView>,
    notes: Vec<NoteView>,
    pending: PendingMutations,
}

impl BoardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: BoardSnapshot) -> Self {
        let mut state = Self::new();
        state.replace_snapshot(snapshot);
        state
    }

    pub fn timelines(&self) -> &[TimelineView] {
        &self.timelines
    }

    pub fn notes(&self) -> &[NoteView] {
        &self.notes
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Stages a provisional timeline: temporary id, next local lane number,
    /// wall-clock timestamp standing in for the server clock. The lane shows
    /// up immediately, in numbering order.
    pub fn stage_timeline(&mut self) -> Result<TimelineView, ReconcileError> {
        let number = self
            .timelines
            .iter()
            .map(|t| t.number)
            .max()
            .unwrap_or(0)
            + 1;
        let view = TimelineView {
            id: mint_local_id(),
            number,
            created_at: Utc::now().to_rfc3339(),
        };
        self.pending.open(&view.id, MutationKind::AddTimeline)?;
        self.timelines.push(view.clone());
        self.sort_timelines();
        Ok(view)
    }

    /// Substitutes the provisional timeline with the server-confirmed one,
    /// a targeted replacement by temporary id, not a reload.
    pub fn confirm_timeline(
        &mut self,
        local_id: &str,
        confirmed: TimelineView,
    ) -> Result<(), ReconcileError> {
        self.pending.resolve(local_id, MutationKind::AddTimeline)?;
        if let Some(slot) = self.timelines.iter_mut().find(|t| t.id == local_id) {
            *slot = confirmed;
        }
        self.sort_timelines();
        Ok(())
    }

    /// Removes the provisional timeline after a failed mutation.
    pub fn rollback_timeline(&mut self, local_id: &str) -> Result<(), ReconcileError> {
        self.pending.resolve(local_id, MutationKind::AddTimeline)?;
        self.timelines.retain(|t| t.id != local_id);
        Ok(())
    }

    /// Stages a provisional published note at the end of the creation order.
    pub fn stage_note(
        &mut self,
        title: &str,
        content: &str,
        line_id: &str,
    ) -> Result<NoteView, ReconcileError> {
        let view = NoteView {
            id: mint_local_id(),
            line_id: line_id.to_string(),
            title: title.to_string(),
            content: content.to_string(),
            status: NoteStatus::Published,
            created_at: Utc::now().to_rfc3339(),
        };
        self.pending.open(&view.id, MutationKind::AddNote)?;
        self.notes.push(view.clone());
        Ok(view)
    }

    pub fn confirm_note(
        &mut self,
        local_id: &str,
        confirmed: NoteView,
    ) -> Result<(), ReconcileError> {
        self.pending.resolve(local_id, MutationKind::AddNote)?;
        if let Some(slot) = self.notes.iter_mut().find(|n| n.id == local_id) {
            *slot = confirmed;
        }
        Ok(())
    }

    pub fn rollback_note(&mut self, local_id: &str) -> Result<(), ReconcileError> {
        self.pending.resolve(local_id, MutationKind::AddNote)?;
        self.notes.retain(|n| n.id != local_id);
        Ok(())
    }

    /// Adopts a fresh authoritative snapshot, discarding any unresolved
    /// optimistic entries. That loss is accepted on a page-level refetch.
    pub fn replace_snapshot(&mut self, snapshot: BoardSnapshot) {
        let discarded = self.pending.discard_all();
        if discarded > 0 {
            tracing::debug!(discarded, "optimistic entries discarded by snapshot replace");
        }
        self.timelines = snapshot.timelines;
        self.notes = snapshot.notes;
        self.sort_timelines();
    }

    /// The board as currently rendered.
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            timelines: self.timelines.clone(),
            notes: self.notes.clone(),
        }
    }

    fn sort_timelines(&mut self) {
        self.timelines.sort_by_key(|t| t.number);
    }
}
