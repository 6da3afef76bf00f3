//! Audit lookup of single stored events.

use axum::extract::State;
use axum::{Json, Router, routing::get};
use jotti_core::repository::StoredEvent;
use tracing::instrument;

use jotti_table::application::query_handlers;

use crate::error::ApiError;
use crate::extract::PathParams;
use crate::state::AppState;

/// GET /{eventId}
#[instrument(skip(state))]
async fn get_event(
    State(state): State<AppState>,
    PathParams(event_id): PathParams<i64>,
) -> Result<Json<StoredEvent>, ApiError> {
    let event = query_handlers::get_event(event_id, &*state.event_repository).await?;
    Ok(Json(event))
}

/// Returns the router for event lookups.
pub fn router() -> Router<AppState> {
    Router::new().route("/{event_id}", get(get_event))
}
