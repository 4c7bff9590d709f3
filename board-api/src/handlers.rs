//! HTTP request handlers for the board API.

use axum::{Json, extract::Path, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use actions::{DraftInput, NoteInput};
use cf_core::types::{BoardSnapshot, NoteView, TimelineView};

use crate::error::ApiFailure;
use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
        }),
    )
}

/// GET /v1/board
///
/// Returns the board snapshot, served from the render cache when no write
/// has invalidated it since the last load.
pub async fn get_board(State(state): State<Arc<AppState>>) -> Json<BoardSnapshot> {
    if let Some(cached) = state.cache.get().await {
        tracing::debug!("board served from cache");
        return Json(cached);
    }
    let snapshot = state.actions.load_board().await;
    state.cache.put(snapshot.clone()).await;
    Json(snapshot)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineCreated {
    pub success: bool,
    pub new_timeline: TimelineView,
}

/// POST /v1/timelines
pub async fn add_timeline(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TimelineCreated>, ApiFailure> {
    let new_timeline = state.actions.add_timeline().await?;
    Ok(Json(TimelineCreated {
        success: true,
        new_timeline,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteCreated {
    pub success: bool,
    pub new_note: NoteView,
}

/// POST /v1/notes
pub async fn add_note(
    State(state): State<Arc<AppState>>,
    Json(input): Json<NoteInput>,
) -> Result<Json<NoteCreated>, ApiFailure> {
    let new_note = state.actions.add_note(input).await?;
    Ok(Json(NoteCreated {
        success: true,
        new_note,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftSavedBody {
    pub success: bool,
    pub draft_id: String,
}

/// POST /v1/drafts
pub async fn save_draft(
    State(state): State<Arc<AppState>>,
    Json(input): Json<DraftInput>,
) -> Result<Json<DraftSavedBody>, ApiFailure> {
    let saved = state.actions.save_draft(input).await?;
    Ok(Json(DraftSavedBody {
        success: true,
        draft_id: saved.draft_id,
    }))
}

/// GET /v1/timelines/{id}/drafts
pub async fn list_drafts(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<NoteView>>, ApiFailure> {
    state
        .actions
        .load_drafts(&id)
        .await
        .map(Json)
        .map_err(|err| {
            tracing::error!(error = %err, "Error loading drafts");
            ApiFailure(errors::ActionError::rejected("Failed to load drafts."))
        })
}

#[derive(Debug, Deserialize)]
pub struct AssistRequest {
    pub content: String,
}

/// Assist responses keep the original action shape: `{title}` or `{error}`,
/// `{summary}` or `{error}`.
#[derive(Debug, Serialize)]
pub struct TitleResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// POST /v1/assist/title
pub async fn suggest_title(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AssistRequest>,
) -> impl IntoResponse {
    match state.actions.suggest_title(&request.content).await {
        Ok(title) => (
            StatusCode::OK,
            Json(TitleResponse {
                title: Some(title),
                error: None,
            }),
        ),
        Err(err) => (
            StatusCode::BAD_GATEWAY,
            Json(TitleResponse {
                title: None,
                error: Some(err.to_string()),
            }),
        ),
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// POST /v1/assist/summary
pub async fn summarize_note(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AssistRequest>,
) -> impl IntoResponse {
    match state.actions.summarize_note(&request.content).await {
        Ok(summary) => (
            StatusCode::OK,
            Json(SummaryResponse {
                summary: Some(summary),
                error: None,
            }),
        ),
        Err(err) => (
            StatusCode::BAD_GATEWAY,
            Json(SummaryResponse {
                summary: None,
                error: Some(err.to_string()),
            }),
        ),
    }
}
