//! Route modules.

use axum::Router;

use crate::state::AppState;

pub mod events;
pub mod health;
pub mod tables;

/// Returns every route of the API, without middleware or state.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/api/v1/tables", tables::router())
        .nest("/api/v1/events", events::router())
}
