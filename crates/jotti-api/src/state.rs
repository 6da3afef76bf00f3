//! Shared application state.

use std::sync::Arc;

use jotti_core::clock::Clock;
use jotti_core::id::IdGenerator;
use jotti_core::repository::EventRepository;
use jotti_table::domain::schema::SchemaRegistry;

/// Application state shared across all request handlers.
///
/// Everything in here is immutable and cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Stamps `occurred_at` on new events.
    pub clock: Arc<dyn Clock>,
    /// Mints order and payment ids.
    pub ids: Arc<dyn IdGenerator>,
    /// The event log.
    pub event_repository: Arc<dyn EventRepository>,
    /// Payload decoders used on replay.
    pub schemas: Arc<SchemaRegistry>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        event_repository: Arc<dyn EventRepository>,
        schemas: SchemaRegistry,
    ) -> Self {
        Self {
            clock,
            ids,
            event_repository,
            schemas: Arc::new(schemas),
        }
    }
}
