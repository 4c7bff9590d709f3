//! Temporary ids and the pending-mutation table.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

/// Reserved prefix of temporary ids. Gateway-assigned ids never start with
/// it, so a provisional entity can always be told apart from a confirmed one.
pub const LOCAL_ID_PREFIX: &str = "local-";

static NEXT_LOCAL_ID: AtomicU64 = AtomicU64::new(1);

/// Mints a process-unique temporary id.
pub fn mint_local_id() -> String {
    let seq = NEXT_LOCAL_ID.fetch_add(1, Ordering::SeqCst);
    format!("{LOCAL_ID_PREFIX}{seq}")
}

pub fn is_local_id(id: &str) -> bool {
    id.starts_with(LOCAL_ID_PREFIX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    AddTimeline,
    AddNote,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("temporary id {id} is already awaiting resolution")]
    AlreadyPending { id: String },

    #[error("temporary id {id} is not awaiting resolution")]
    NotPending { id: String },

    #[error("temporary id {id} is awaiting a different mutation")]
    KindMismatch { id: String },
}

/// The temporary-id → mutation table.
///
/// Every optimistic entity registers here when staged and leaves exactly
/// once: either confirmed, rolled back, or discarded wholesale by a snapshot
/// replace. A second resolution of the same id, or a resolution under the
/// wrong mutation kind, is an error rather than a silent corruption.
#[derive(Debug, Default)]
pub struct PendingMutations {
    entries: HashMap<String, MutationKind>,
}

impl PendingMutations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, id: &str, kind: MutationKind) -> Result<(), ReconcileError> {
        if self.entries.contains_key(id) {
            return Err(ReconcileError::AlreadyPending { id: id.to_string() });
        }
        self.entries.insert(id.to_string(), kind);
        Ok(())
    }

    pub fn resolve(&mut self, id: &str, kind: MutationKind) -> Result<(), ReconcileError> {
        match self.entries.get(id) {
            None => Err(ReconcileError::NotPending { id: id.to_string() }),
            Some(pending) if *pending != kind => {
                Err(ReconcileError::KindMismatch { id: id.to_string() })
            }
            Some(_) => {
                self.entries.remove(id);
                Ok(())
            }
        }
    }

    /// Discards every open entry. Used when a fresh authoritative snapshot
    /// replaces the local collections.
    pub fn discard_all(&mut self) -> usize {
        let discarded = self.entries.len();
        self.entries.clear();
        discarded
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
