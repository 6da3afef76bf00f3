//! Request extractors that report malformed input as validation errors.
//!
//! axum's own `Json` and `Path` reject with a plain-text body. These wrap
//! them so the client always gets the JSON error body of [`ApiError`].

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts};
use jotti_core::error::{DomainError, ValidationErrors};

use crate::error::ApiError;

/// JSON request body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Typed path parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct PathParams<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(DomainError::Validation(ValidationErrors::single(
            "body",
            rejection.body_text(),
        )))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self(DomainError::Validation(ValidationErrors::single(
            "path",
            rejection.body_text(),
        )))
    }
}
