//! Event fixtures.

use chrono::{DateTime, TimeZone, Utc};
use jotti_core::repository::StoredEvent;

/// Fixed timestamp shared by tests.
///
/// # Panics
///
/// Never; the date is valid.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
}

/// Builds a `StoredEvent` as a store would return it, with actor 1 and the
/// fixed timestamp.
#[must_use]
pub fn stored_event(
    id: i64,
    event_type: &str,
    subject: &str,
    payload: serde_json::Value,
) -> StoredEvent {
    StoredEvent {
        id,
        actor_id: 1,
        event_type: event_type.to_owned(),
        subject: subject.to_owned(),
        payload,
        occurred_at: fixed_now(),
    }
}
