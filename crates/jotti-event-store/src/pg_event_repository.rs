//! `PostgreSQL` implementation of the `EventRepository` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::{debug, error};

use jotti_core::error::DomainError;
use jotti_core::event::NewEvent;
use jotti_core::repository::{EventRepository, StoredEvent};

const INSERT_EVENT: &str = r"
INSERT INTO events (actor_id, type, subject, payload, occurred_at)
VALUES ($1, $2, $3, $4, $5)
RETURNING id
";

const SELECT_BY_SUBJECT: &str = r"
SELECT id, actor_id, type AS event_type, subject, payload, occurred_at
FROM events
WHERE subject = $1
ORDER BY id ASC
";

const SELECT_BY_SUBJECT_AND_TYPES: &str = r"
SELECT id, actor_id, type AS event_type, subject, payload, occurred_at
FROM events
WHERE subject = $1 AND type = ANY($2)
ORDER BY id ASC
";

const SELECT_BY_ID: &str = r"
SELECT id, actor_id, type AS event_type, subject, payload, occurred_at
FROM events
WHERE id = $1
";

#[derive(Debug, sqlx::FromRow)]
struct EventRow {
    id: i64,
    actor_id: i64,
    event_type: String,
    subject: String,
    payload: serde_json::Value,
    occurred_at: DateTime<Utc>,
}

impl From<EventRow> for StoredEvent {
    fn from(row: EventRow) -> Self {
        Self {
            id: row.id,
            actor_id: row.actor_id,
            event_type: row.event_type,
            subject: row.subject,
            payload: row.payload,
            occurred_at: row.occurred_at,
        }
    }
}

/// Translates a driver error into the domain taxonomy. Only the operation
/// name reaches the caller; the driver detail is logged here.
fn map_sqlx_error(err: &sqlx::Error, operation: &'static str) -> DomainError {
    error!(error = %err, operation, "event store operation failed");
    DomainError::Storage(format!("{operation} failed"))
}

/// PostgreSQL-backed event repository.
#[derive(Debug, Clone)]
pub struct PgEventRepository {
    pool: PgPool,
}

impl PgEventRepository {
    /// Creates a new `PgEventRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for PgEventRepository {
    async fn append(&self, event: &NewEvent) -> Result<i64, DomainError> {
        // The insert runs in an explicit transaction: if this future is
        // dropped before `commit`, sqlx rolls the transaction back.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error(&e, "append"))?;

        let id: i64 = sqlx::query_scalar::<_, i64>(INSERT_EVENT)
            .bind(event.actor_id())
            .bind(event.event_type())
            .bind(event.subject())
            .bind(event.payload())
            .bind(event.occurred_at())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error(&e, "append"))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error(&e, "append"))?;

        debug!(
            event_id = id,
            event_type = event.event_type(),
            subject = event.subject(),
            "event appended"
        );
        Ok(id)
    }

    async fn query_by_subject(
        &self,
        subject: &str,
        event_types: &[&str],
    ) -> Result<Vec<StoredEvent>, DomainError> {
        let rows: Vec<EventRow> = if event_types.is_empty() {
            sqlx::query_as::<_, EventRow>(SELECT_BY_SUBJECT)
                .bind(subject)
                .fetch_all(&self.pool)
                .await
        } else {
            let types: Vec<String> = event_types.iter().map(|t| (*t).to_owned()).collect();
            sqlx::query_as::<_, EventRow>(SELECT_BY_SUBJECT_AND_TYPES)
                .bind(subject)
                .bind(types)
                .fetch_all(&self.pool)
                .await
        }
        .map_err(|e| map_sqlx_error(&e, "query_by_subject"))?;

        debug!(subject, event_count = rows.len(), "events read by subject");
        Ok(rows.into_iter().map(StoredEvent::from).collect())
    }

    async fn read_by_id(&self, id: i64) -> Result<StoredEvent, DomainError> {
        let row: Option<EventRow> = sqlx::query_as::<_, EventRow>(SELECT_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(&e, "read_by_id"))?;

        row.map(StoredEvent::from).ok_or_else(|| {
            debug!(event_id = id, "event not found");
            DomainError::NotFound(id)
        })
    }
}
