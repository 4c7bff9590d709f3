//! Error types for the board API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use errors::ActionError;

/// Result type alias for server setup and lifecycle.
pub type Result<T> = std::result::Result<T, ServerError>;

/// Errors outside the endpoint envelopes: startup and lifecycle failures.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Storage setup error: {0}")]
    Storage(String),

    #[error("Server error: {0}")]
    Server(String),
}

/// Envelope body of a failed mutation. Shapes match what the web client has
/// always consumed: a per-field `errors` map for validation, a single
/// `error` message for everything else.
#[derive(Debug, Serialize)]
pub struct FailureBody {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Wrapper giving [`ActionError`] an HTTP rendering: validation maps to 422,
/// rejections to 502, both carrying the structured envelope.
#[derive(Debug)]
pub struct ApiFailure(pub ActionError);

impl From<ActionError> for ApiFailure {
    fn from(err: ActionError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        match self.0 {
            ActionError::Validation { fields } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(FailureBody {
                    success: false,
                    errors: serde_json::to_value(&fields).ok(),
                    error: None,
                }),
            )
                .into_response(),
            ActionError::Rejected { message } => (
                StatusCode::BAD_GATEWAY,
                Json(FailureBody {
                    success: false,
                    errors: None,
                    error: Some(message),
                }),
            )
                .into_response(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "request failed outside an endpoint envelope");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "success": false, "error": "Internal server error." })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_failure_serializes_the_field_map() {
        let failure = ApiFailure(ActionError::field("title", "Title is required."));
        let response = failure.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn rejection_maps_to_bad_gateway() {
        let failure = ApiFailure(ActionError::rejected("Failed to add timeline."));
        let response = failure.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
