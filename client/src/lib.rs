//! # Board Client
//!
//! The optimistic half of the system: a locally held board that stays
//! responsive while mutations are in flight, reconciled against the
//! endpoints' confirmed results. The pending-mutation table makes the
//! exactly-once resolution of every temporary id an explicit, checkable
//! invariant instead of a property of captured closures.

pub mod board;
pub mod media;
pub mod pending;
pub mod reconciler;

pub use board::BoardState;
pub use pending::{MutationKind, PendingMutations, ReconcileError, is_local_id, mint_local_id};
pub use reconciler::Board;
