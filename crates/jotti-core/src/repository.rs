//! Event repository abstraction.
//!
//! The event log is append-only. No implementation offers, and no caller may
//! issue, an update or delete of a stored row. For stores backed by a
//! general-purpose database this is a contract, not an enforced constraint.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::DomainError;
use crate::event::NewEvent;

/// Stored representation of an event, as read back from the log.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredEvent {
    /// Store-assigned id. Ascending ids define the canonical replay order.
    pub id: i64,
    /// The user who caused the fact.
    pub actor_id: i64,
    /// Versioned event type, e.g. `table.order-placed:v1`.
    #[serde(rename = "type")]
    pub event_type: String,
    /// Partition key, e.g. `table:1`.
    pub subject: String,
    /// Schema-on-read payload.
    pub payload: serde_json::Value,
    /// Wall-clock creation time. Informational only; never used for ordering.
    pub occurred_at: DateTime<Utc>,
}

/// Append-only store of events, partitioned by subject.
///
/// Every method may be cancelled by dropping its future. Implementations
/// must make that safe: a dropped `append` leaves no row, and a dropped query
/// yields nothing.
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Appends a single event and returns its store-assigned id.
    ///
    /// Ids are strictly increasing across the whole store.
    async fn append(&self, event: &NewEvent) -> Result<i64, DomainError>;

    /// Loads every event for `subject` in ascending id order.
    ///
    /// If `event_types` is non-empty only events whose type is listed are
    /// returned.
    async fn query_by_subject(
        &self,
        subject: &str,
        event_types: &[&str],
    ) -> Result<Vec<StoredEvent>, DomainError>;

    /// Loads a single event by id.
    ///
    /// Returns `DomainError::NotFound` if no such event exists.
    async fn read_by_id(&self, id: i64) -> Result<StoredEvent, DomainError>;
}
