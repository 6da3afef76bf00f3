//! Domain error types.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// A single failed constraint on an input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    /// Path of the offending field, e.g. `products[1].quantity`.
    pub field: String,
    /// Human-readable description of the violated constraint.
    pub message: String,
}

impl FieldViolation {
    /// Creates a new violation for `field`.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Ordered collection of field violations produced by a validator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldViolation>);

impl ValidationErrors {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a collection holding a single violation.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self(vec![FieldViolation::new(field, message)])
    }

    /// Records a violation.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldViolation::new(field, message));
    }

    /// Returns `true` if no violation was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the recorded violations in insertion order.
    #[must_use]
    pub fn violations(&self) -> &[FieldViolation] {
        &self.0
    }

    /// Returns `true` if a violation was recorded for exactly `field`.
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|v| v.field == field)
    }

    /// Converts the collection into a `Result`, failing if any violation
    /// was recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` if it is non-empty.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, violation) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", violation.field, violation.message)?;
        }
        Ok(())
    }
}

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A command or payload failed validation. Never persisted.
    #[error("validation error: {0}")]
    Validation(ValidationErrors),

    /// A stored event carries a type no registered schema understands, or a
    /// type the caller did not expect.
    #[error("unsupported event type: {0}")]
    UnsupportedEventType(String),

    /// A stored event carries a subject that does not parse.
    #[error("invalid event subject: {0}")]
    InvalidSubject(String),

    /// A point lookup found no event with the given id.
    #[error("event not found: {0}")]
    NotFound(i64),

    /// A stored event decoded but failed validation on replay.
    #[error("corrupt stored event: {0}")]
    CorruptEvent(String),

    /// An infrastructure/persistence error.
    #[error("storage error: {0}")]
    Storage(String),
}

impl DomainError {
    /// Returns `true` for transient failures a caller may retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage(_))
    }

    /// Returns `true` for stored data that can no longer be replayed.
    #[must_use]
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedEventType(_) | Self::InvalidSubject(_) | Self::CorruptEvent(_)
        )
    }
}

impl From<ValidationErrors> for DomainError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}
