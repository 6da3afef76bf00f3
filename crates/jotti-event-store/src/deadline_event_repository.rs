//! Deadline-bounded `EventRepository` decorator.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use jotti_core::error::DomainError;
use jotti_core::event::NewEvent;
use jotti_core::repository::{EventRepository, StoredEvent};

/// Wraps another repository and bounds every call by `deadline`.
///
/// When the deadline passes the inner future is dropped, which cancels the
/// call without partial effect, and a `DomainError::Storage` is returned.
/// No retry is attempted.
#[derive(Debug, Clone)]
pub struct DeadlineEventRepository<R> {
    inner: R,
    deadline: Duration,
}

impl<R> DeadlineEventRepository<R> {
    /// Wraps `inner`, bounding each call by `deadline`.
    #[must_use]
    pub fn new(inner: R, deadline: Duration) -> Self {
        Self { inner, deadline }
    }

    /// Returns the wrapped repository.
    pub fn inner(&self) -> &R {
        &self.inner
    }
}

async fn bounded<T, F>(
    deadline: Duration,
    operation: &'static str,
    call: F,
) -> Result<T, DomainError>
where
    T: Send,
    F: Future<Output = Result<T, DomainError>> + Send,
{
    if let Ok(result) = tokio::time::timeout(deadline, call).await {
        result
    } else {
        warn!(operation, deadline = ?deadline, "event store call cancelled at deadline");
        Err(DomainError::Storage(format!(
            "{operation} exceeded deadline of {}ms",
            deadline.as_millis()
        )))
    }
}

#[async_trait]
impl<R: EventRepository> EventRepository for DeadlineEventRepository<R> {
    async fn append(&self, event: &NewEvent) -> Result<i64, DomainError> {
        bounded(self.deadline, "append", self.inner.append(event)).await
    }

    async fn query_by_subject(
        &self,
        subject: &str,
        event_types: &[&str],
    ) -> Result<Vec<StoredEvent>, DomainError> {
        bounded(
            self.deadline,
            "query_by_subject",
            self.inner.query_by_subject(subject, event_types),
        )
        .await
    }

    async fn read_by_id(&self, id: i64) -> Result<StoredEvent, DomainError> {
        bounded(self.deadline, "read_by_id", self.inner.read_by_id(id)).await
    }
}
