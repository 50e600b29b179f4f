// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Application-wide error type, with `thiserror` for ergonomics.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error")]
    ValidationError(#[from] validator::ValidationErrors),

    // Semantic input problems the `validator` derive cannot express
    // (blank rejection reason, unsupported import type, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0} not found")]
    ResourceNotFound(String),

    #[error("Unique constraint violation: {0}")]
    UniqueConstraintViolation(String),

    // Lost optimistic-concurrency races and attempts to re-decide
    // an already approved/rejected document land here.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("E-mail already in use")]
    EmailAlreadyExists,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("User not found")]
    UserNotFound,

    // Database errors (sqlx)
    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),

    // Generic catch-all for anything unexpected.
    // `anyhow::Error` keeps the context of the original failure.
    #[error("Internal server error")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Bcrypt error: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Return every field-level validation detail.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "One or more fields are invalid.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::ResourceNotFound(resource) => {
                (StatusCode::NOT_FOUND, format!("{} not found.", resource))
            }
            AppError::UniqueConstraintViolation(msg) => (StatusCode::CONFLICT, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::EmailAlreadyExists => {
                (StatusCode::CONFLICT, "This e-mail is already in use.".to_string())
            }
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid e-mail or password.".to_string())
            }
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Missing or invalid authentication token.".to_string(),
            ),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "User not found.".to_string()),

            // Everything else (DatabaseError, InternalServerError, ...) becomes a 500.
            // `tracing` logs the detailed message that `thiserror` gave us; the
            // client only ever sees a generic line.
            ref e => {
                tracing::error!("Internal server error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred.".to_string(),
                )
            }
        };

        // Standard shape for simple errors that only carry a message.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
