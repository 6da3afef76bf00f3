//! In-memory implementation of the `EventRepository` trait.
//!
//! Holds the whole log in a single vector behind a lock. Used by tests and
//! for running the API locally without a database.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tracing::debug;

use jotti_core::error::DomainError;
use jotti_core::event::NewEvent;
use jotti_core::repository::{EventRepository, StoredEvent};

fn poisoned() -> DomainError {
    DomainError::Storage("in-memory event log lock poisoned".into())
}

/// Thread-safe in-memory event repository.
///
/// Ids start at 1 and increase by one per append. Appends take the write
/// lock for a single, await-free critical section, so they are atomic and
/// cannot be observed half-done.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventRepository {
    events: Arc<RwLock<Vec<StoredEvent>>>,
}

impl InMemoryEventRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored events.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Storage` if the lock is poisoned.
    pub fn len(&self) -> Result<usize, DomainError> {
        Ok(self.events.read().map_err(|_| poisoned())?.len())
    }

    /// Returns `true` if nothing was ever appended.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Storage` if the lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, DomainError> {
        Ok(self.len()? == 0)
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    async fn append(&self, event: &NewEvent) -> Result<i64, DomainError> {
        let mut events = self.events.write().map_err(|_| poisoned())?;
        let id = events.last().map_or(1, |last| last.id + 1);
        events.push(StoredEvent {
            id,
            actor_id: event.actor_id(),
            event_type: event.event_type().to_owned(),
            subject: event.subject().to_owned(),
            payload: event.payload().clone(),
            occurred_at: event.occurred_at(),
        });
        debug!(event_id = id, subject = event.subject(), "event appended");
        Ok(id)
    }

    async fn query_by_subject(
        &self,
        subject: &str,
        event_types: &[&str],
    ) -> Result<Vec<StoredEvent>, DomainError> {
        let events = self.events.read().map_err(|_| poisoned())?;
        Ok(events
            .iter()
            .filter(|e| e.subject == subject)
            .filter(|e| event_types.is_empty() || event_types.contains(&e.event_type.as_str()))
            .cloned()
            .collect())
    }

    async fn read_by_id(&self, id: i64) -> Result<StoredEvent, DomainError> {
        let events = self.events.read().map_err(|_| poisoned())?;
        events
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or(DomainError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::json;

    use super::*;

    fn event(subject: &str, event_type: &str, minutes: i64) -> NewEvent {
        let base = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        NewEvent::new(
            1,
            event_type,
            subject,
            json!({"n": minutes}),
            base + Duration::minutes(minutes),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_append_assigns_increasing_ids_from_one() {
        // Arrange
        let repo = InMemoryEventRepository::new();

        // Act
        let first = repo.append(&event("table:1", "table.order-placed:v1", 0)).await.unwrap();
        let second = repo.append(&event("table:2", "table.order-placed:v1", 1)).await.unwrap();

        // Assert
        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert_eq!(repo.len().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_query_by_subject_isolates_subjects_and_keeps_id_order() {
        // Arrange — timestamps deliberately run backwards.
        let repo = InMemoryEventRepository::new();
        repo.append(&event("table:1", "table.order-placed:v1", 30)).await.unwrap();
        repo.append(&event("table:2", "table.order-placed:v1", 20)).await.unwrap();
        repo.append(&event("table:1", "table.order-placed:v1", 10)).await.unwrap();

        // Act
        let loaded = repo.query_by_subject("table:1", &[]).await.unwrap();

        // Assert
        let ids: Vec<i64> = loaded.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(loaded.iter().all(|e| e.subject == "table:1"));
    }

    #[tokio::test]
    async fn test_query_by_subject_filters_by_type() {
        // Arrange
        let repo = InMemoryEventRepository::new();
        repo.append(&event("table:1", "table.order-placed:v1", 0)).await.unwrap();
        repo.append(&event("table:1", "table.payment-registered:v1", 1)).await.unwrap();

        // Act
        let orders = repo
            .query_by_subject("table:1", &["table.order-placed:v1"])
            .await
            .unwrap();

        // Assert
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].event_type, "table.order-placed:v1");
    }

    #[tokio::test]
    async fn test_read_by_id_returns_stored_event() {
        // Arrange
        let repo = InMemoryEventRepository::new();
        let id = repo.append(&event("table:4", "table.order-placed:v1", 0)).await.unwrap();

        // Act
        let stored = repo.read_by_id(id).await.unwrap();

        // Assert
        assert_eq!(stored.id, id);
        assert_eq!(stored.subject, "table:4");
        assert_eq!(stored.payload, json!({"n": 0}));
    }

    #[tokio::test]
    async fn test_read_by_id_returns_not_found_for_unknown_id() {
        let repo = InMemoryEventRepository::new();

        let result = repo.read_by_id(42).await;

        match result {
            Err(DomainError::NotFound(id)) => assert_eq!(id, 42),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }
}
