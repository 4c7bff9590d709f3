//! # Board API
//!
//! HTTP surface of the ChronoFlow board. Exposes the mutation endpoints and
//! the board snapshot over JSON, with the same result envelopes the web
//! client has always consumed.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /v1/board` - Board snapshot (timelines + published notes), cached
//!   until the next successful write
//! - `POST /v1/timelines` - Add a timeline
//! - `POST /v1/notes` - Add or promote a note
//! - `POST /v1/drafts` - Save a draft
//! - `GET /v1/timelines/{id}/drafts` - Drafts of one timeline
//! - `POST /v1/assist/title` - AI title suggestion
//! - `POST /v1/assist/summary` - AI note summary

pub mod cache;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

pub use error::ServerError;
pub use server::BoardApiServer;
pub use state::AppState;
