//! Typed, validated endpoint inputs.
//!
//! The original endpoints took an untyped form-data bag; here every endpoint
//! owns an input struct whose constraints are declared with `validator`
//! derives, producing the per-field error map the dialog renders. Nothing
//! downstream ever sees an unvalidated field.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::messages;
use errors::{ActionError, FieldErrors};

/// Input of the note creation / publish endpoint. All three text fields are
/// required; `draft_id` selects the promote-in-place branch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoteInput {
    #[validate(length(min = 1, message = "Title is required."))]
    #[serde(default)]
    pub title: String,

    #[validate(length(min = 1, message = "Content is required."))]
    #[serde(default)]
    pub content: String,

    #[validate(length(min = 1, message = "Timeline selection is required."))]
    #[serde(default)]
    pub line_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft_id: Option<String>,
}

/// Input of the draft save endpoint. Drafts may be incomplete: title and
/// content are free to be empty, only the timeline reference is required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DraftInput {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub content: String,

    #[validate(length(min = 1, message = "Timeline selection is required."))]
    #[serde(default)]
    pub line_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft_id: Option<String>,
}

/// Flattens `validator`'s output into the wire-facing field map, translating
/// struct field names to their camelCase wire names.
pub(crate) fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    let mut map = FieldErrors::new();
    for (field, field_errs) in errors.field_errors() {
        let wire = wire_name(field.as_ref());
        for err in field_errs.iter() {
            let message = err
                .message
                .clone()
                .map_or_else(|| "Invalid value.".to_string(), |m| m.to_string());
            map.push(wire, message);
        }
    }
    map
}

pub(crate) fn validation_error(errors: &ValidationErrors) -> ActionError {
    ActionError::Validation {
        fields: field_errors(errors),
    }
}

/// Field error reported when the referenced timeline does not exist.
pub(crate) fn unknown_timeline() -> ActionError {
    ActionError::field("lineId", messages::LINE_UNKNOWN)
}

fn wire_name(field: &str) -> &str {
    match field {
        "line_id" => "lineId",
        "draft_id" => "draftId",
        other => other,
    }
}
