//! Shared types and traits for the ChronoFlow board.
//!
//! Domain entities (timelines, notes and their hydrated views), the document
//! value model spoken by the persistence gateway, and the traits the
//! endpoints depend on.

pub mod document;
pub mod traits;
pub mod types;

pub use document::{Collection, Direction, Document, DocumentQuery, DocumentWrite, WriteValue};
pub use traits::{CacheInvalidator, DocumentStore, NoopInvalidator, NoteAssistant};
pub use types::{
    BoardSnapshot, DraftSaved, Note, NoteId, NoteStatus, NoteView, Timeline, TimelineId,
    TimelineView,
};
