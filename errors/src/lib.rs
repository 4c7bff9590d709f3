//! # ChronoFlow Errors
//!
//! Shared error taxonomy for the board: storage failures, assist failures,
//! and the structured endpoint results. Uses `thiserror` for definitions;
//! nothing in this crate panics or escapes as an unhandled fault.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage layer errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Connection to {backend} failed: {reason}")]
    Connection { backend: String, reason: String },

    #[error("Request to {backend} failed: {reason}")]
    Request { backend: String, reason: String },

    #[error("Write to {backend} rejected: {reason}")]
    WriteRejected { backend: String, reason: String },

    #[error("Not found in {collection}: {id}")]
    NotFound { collection: String, id: String },

    #[error("Failed to decode {collection} document: {reason}")]
    Decode { collection: String, reason: String },

    #[error("Serialization error: {reason}")]
    Serialization { reason: String },
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Assist (AI model) errors
#[derive(Debug, Error)]
pub enum AssistError {
    #[error("Model request failed: {reason}")]
    Request { reason: String },

    #[error("Model returned an empty response")]
    EmptyResponse,

    #[error("Model response malformed: {reason}")]
    Malformed { reason: String },
}

pub type AssistResult<T> = Result<T, AssistError>;

/// Per-field validation messages, keyed by the wire-facing field name
/// (`title`, `content`, `lineId`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

/// Structured failure of a mutation endpoint. Every failure is either a
/// per-field validation map (no write attempted) or a rejection carrying the
/// one generic message shown to the user; the underlying cause is logged at
/// the endpoint boundary and never travels in this type.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ActionError {
    #[error("validation failed")]
    Validation { fields: FieldErrors },

    #[error("{message}")]
    Rejected { message: String },
}

impl ActionError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut fields = FieldErrors::new();
        fields.push(field, message);
        Self::Validation { fields }
    }
}

pub type ActionResult<T> = Result<T, ActionError>;
