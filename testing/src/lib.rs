//! Shared test fixtures for the ChronoFlow workspace.
//!
//! Everything runs in-process against the in-memory store and the mock
//! assistant; no external services are needed.

mod fixtures;

pub use fixtures::*;
