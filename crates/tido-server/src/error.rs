//! Request-level error taxonomy.
//!
//! Every failure is terminal for its request and maps to exactly one HTTP
//! response. Store and hashing failures are wrapped as `Internal` and
//! reported with an opaque body; the underlying error only reaches the log.

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug)]
pub enum ApiError {
    /// Malformed, missing, or out-of-range input.
    Validation(String),
    /// Duplicate email or username on registration.
    Conflict(String),
    /// No user matched the supplied login id.
    NotFound(String),
    /// Password did not match the stored hash.
    WrongPassword,
    /// No valid authenticated session on a protected route.
    Unauthorized,
    /// Database or session store failure.
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Login lookup misses surface as 400 on the login form, not 404.
        let (status, message) = match self {
            ApiError::Validation(msg) | ApiError::Conflict(msg) | ApiError::NotFound(msg) => {
                (StatusCode::BAD_REQUEST, msg)
            }
            ApiError::WrongPassword => (StatusCode::BAD_REQUEST, "incorrect password".to_string()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string()),
            ApiError::Internal(e) => {
                tracing::error!(error = %e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({"error": message}))).into_response()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(msg) => write!(f, "validation failed: {msg}"),
            ApiError::Conflict(msg) => write!(f, "conflict: {msg}"),
            ApiError::NotFound(msg) => write!(f, "not found: {msg}"),
            ApiError::WrongPassword => write!(f, "incorrect password"),
            ApiError::Unauthorized => write!(f, "unauthorized"),
            ApiError::Internal(e) => write!(f, "internal error: {e}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Internal(e)
    }
}
