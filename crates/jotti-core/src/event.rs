//! Event envelope.
//!
//! An event is an immutable fact. It is built and validated as a
//! [`NewEvent`], handed to an [`EventRepository`](crate::repository::EventRepository)
//! once, and from then on only ever read back as a
//! [`StoredEvent`](crate::repository::StoredEvent).

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{DomainError, ValidationErrors};

/// Minimum trimmed length of an event type such as `table.order-placed:v1`.
pub const MIN_EVENT_TYPE_LEN: usize = 5;

/// Minimum trimmed length of an event subject such as `table:1`.
pub const MIN_SUBJECT_LEN: usize = 3;

/// A validated event that has not been assigned a store id yet.
///
/// Fields are private: the only way to obtain a `NewEvent` is through
/// [`NewEvent::new`] or [`NewEvent::from_payload`], both of which enforce the
/// envelope invariants.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    actor_id: i64,
    event_type: String,
    subject: String,
    payload: serde_json::Value,
    occurred_at: DateTime<Utc>,
}

impl NewEvent {
    /// Creates a new event envelope.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` listing every violated envelope
    /// invariant: non-positive actor, too-short type or subject, epoch
    /// timestamp, or `null` payload.
    pub fn new(
        actor_id: i64,
        event_type: impl Into<String>,
        subject: impl Into<String>,
        payload: serde_json::Value,
        occurred_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let event = Self {
            actor_id,
            event_type: event_type.into(),
            subject: subject.into(),
            payload,
            occurred_at,
        };
        event.validate()?;
        Ok(event)
    }

    /// Serializes a typed payload and wraps it in a new event envelope.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the payload cannot be serialized
    /// or the envelope is invalid.
    pub fn from_payload<T: Serialize>(
        actor_id: i64,
        event_type: impl Into<String>,
        subject: impl Into<String>,
        payload: &T,
        occurred_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let payload = serde_json::to_value(payload).map_err(|e| {
            DomainError::Validation(ValidationErrors::single("payload", e.to_string()))
        })?;
        Self::new(actor_id, event_type, subject, payload, occurred_at)
    }

    fn validate(&self) -> Result<(), DomainError> {
        let mut errors = ValidationErrors::new();
        if self.actor_id <= 0 {
            errors.push("actorId", "must be a positive integer");
        }
        if self.event_type.trim().len() < MIN_EVENT_TYPE_LEN {
            errors.push(
                "type",
                format!("must be at least {MIN_EVENT_TYPE_LEN} characters long"),
            );
        }
        if self.occurred_at == DateTime::<Utc>::default() {
            errors.push("occurredAt", "must not be zero");
        }
        if self.subject.trim().len() < MIN_SUBJECT_LEN {
            errors.push(
                "subject",
                format!("must be at least {MIN_SUBJECT_LEN} characters long"),
            );
        }
        if self.payload.is_null() {
            errors.push("payload", "must not be empty");
        }
        errors.into_result().map_err(DomainError::Validation)
    }

    /// The user who caused the fact.
    #[must_use]
    pub fn actor_id(&self) -> i64 {
        self.actor_id
    }

    /// The versioned event type.
    #[must_use]
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// The partition key.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// The schema-on-read payload.
    #[must_use]
    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }

    /// When the fact occurred.
    #[must_use]
    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}
