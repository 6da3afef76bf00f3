//! Jotti API — error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use jotti_core::error::{DomainError, ValidationErrors};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Database connection or pool error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration failed.
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),

    /// The tracing subscriber or span exporter could not be installed.
    #[error("telemetry error: {0}")]
    Telemetry(String),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
    /// Failed field constraints, for validation errors only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ValidationErrors>,
}

/// HTTP-layer wrapper around `DomainError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self.0 {
            DomainError::Validation(details) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "validation_error",
                    message: "request failed validation".to_owned(),
                    details: Some(details),
                },
            ),
            DomainError::NotFound(id) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: "not_found",
                    message: format!("event {id} not found"),
                    details: None,
                },
            ),
            DomainError::Storage(detail) => {
                error!(%detail, "storage unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorBody {
                        error: "storage_unavailable",
                        message: "storage is temporarily unavailable".to_owned(),
                        details: None,
                    },
                )
            }
            err @ (DomainError::UnsupportedEventType(_)
            | DomainError::InvalidSubject(_)
            | DomainError::CorruptEvent(_)) => {
                error!(error = %err, "stored data cannot be replayed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "internal_error",
                        message: "internal error".to_owned(),
                        details: None,
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
