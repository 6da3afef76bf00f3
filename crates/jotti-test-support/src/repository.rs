//! Test repositories — mock `EventRepository` implementations for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use jotti_core::error::DomainError;
use jotti_core::event::NewEvent;
use jotti_core::repository::{EventRepository, StoredEvent};

/// An event repository that records every `append` and every
/// `query_by_subject` call. Queries return the configured events for the
/// requested subject, filtered by type like a real store would.
#[derive(Debug)]
pub struct RecordingEventRepository {
    events: Vec<StoredEvent>,
    appended: Mutex<Vec<NewEvent>>,
    queries: Mutex<Vec<(String, Vec<String>)>>,
}

impl RecordingEventRepository {
    /// Create a new recording repository that serves `events` to queries.
    #[must_use]
    pub fn new(events: Vec<StoredEvent>) -> Self {
        Self {
            events,
            appended: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of all events that were appended.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn appended_events(&self) -> Vec<NewEvent> {
        self.appended.lock().unwrap().clone()
    }

    /// Returns the `(subject, event_types)` pairs of every query made.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn queries(&self) -> Vec<(String, Vec<String>)> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventRepository for RecordingEventRepository {
    async fn append(&self, event: &NewEvent) -> Result<i64, DomainError> {
        let mut appended = self.appended.lock().unwrap();
        appended.push(event.clone());
        let max_configured = self.events.iter().map(|e| e.id).max().unwrap_or(0);
        Ok(max_configured + i64::try_from(appended.len()).unwrap())
    }

    async fn query_by_subject(
        &self,
        subject: &str,
        event_types: &[&str],
    ) -> Result<Vec<StoredEvent>, DomainError> {
        self.queries.lock().unwrap().push((
            subject.to_owned(),
            event_types.iter().map(|t| (*t).to_owned()).collect(),
        ));
        Ok(self
            .events
            .iter()
            .filter(|e| e.subject == subject)
            .filter(|e| event_types.is_empty() || event_types.contains(&e.event_type.as_str()))
            .cloned()
            .collect())
    }

    async fn read_by_id(&self, id: i64) -> Result<StoredEvent, DomainError> {
        self.events
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or(DomainError::NotFound(id))
    }
}

/// An event repository that always returns a storage error. Useful for
/// testing error-handling paths.
#[derive(Debug)]
pub struct FailingEventRepository;

#[async_trait]
impl EventRepository for FailingEventRepository {
    async fn append(&self, _event: &NewEvent) -> Result<i64, DomainError> {
        Err(DomainError::Storage("connection refused".into()))
    }

    async fn query_by_subject(
        &self,
        _subject: &str,
        _event_types: &[&str],
    ) -> Result<Vec<StoredEvent>, DomainError> {
        Err(DomainError::Storage("connection refused".into()))
    }

    async fn read_by_id(&self, _id: i64) -> Result<StoredEvent, DomainError> {
        Err(DomainError::Storage("connection refused".into()))
    }
}
