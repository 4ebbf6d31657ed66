//! Error types for Libros server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::repository::StoreError;

/// Message returned for every missing book
pub const BOOK_NOT_FOUND: &str = "Libro no encontrado";

/// Message returned for faults whose detail must not reach the client
pub const INTERNAL_ERROR: &str = "Error interno del servidor";

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn book_not_found() -> Self {
        AppError::NotFound(BOOK_NOT_FOUND.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            // Callers cannot tell a malformed id from an unknown one
            StoreError::InvalidId(_) => AppError::book_not_found(),
            StoreError::Validation(msg) => AppError::Validation(msg),
            StoreError::Database(e) => AppError::Database(e),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                INTERNAL_ERROR.to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                INTERNAL_ERROR.to_string()
            }
            AppError::Authentication(msg) => {
                tracing::warn!("Authentication rejected: {}", msg);
                msg
            }
            AppError::Unavailable(msg) => {
                tracing::warn!("Service unavailable: {}", msg);
                msg
            }
            AppError::NotFound(msg) | AppError::Validation(msg) | AppError::BadRequest(msg) => msg,
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

/// Flatten field validation errors into a single client-facing message.
///
/// Messages are sorted so the output does not depend on map ordering.
pub fn validation_message(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("{}: {}", field, e.code),
            })
        })
        .collect();
    messages.sort();
    messages.join("; ")
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
