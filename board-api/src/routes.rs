//! Route definitions for the board API.

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers;
use crate::state::AppState;

/// Creates the Axum router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        .route("/board", get(handlers::get_board))
        .route("/timelines", post(handlers::add_timeline))
        .route("/timelines/{id}/drafts", get(handlers::list_drafts))
        .route("/notes", post(handlers::add_note))
        .route("/drafts", post(handlers::save_draft))
        .route("/assist/title", post(handlers::suggest_title))
        .route("/assist/summary", post(handlers::summarize_note));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/v1", api_v1)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
