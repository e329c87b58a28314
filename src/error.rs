use crate::database::DatabaseError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sqlx::Error as SqlxError;
use thiserror::Error;

/// Application-level error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Record store errors surfaced through a service
    #[error("Repository error: {0}")]
    Repository(RepositoryError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Generic error with message
    #[error("{0}")]
    Message(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Check if error is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }

    /// Get HTTP status code for the error
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::NotFound(_) => 404,
            AppError::Validation(_) => 400,
            AppError::Config(_) => 500,
            AppError::Database(_) | AppError::Repository(_) => 500,
            AppError::Message(_) => 500,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

/// Failures of the upstream price feed. Every variant means the live
/// source is unavailable for this cycle.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Transport failure, including timeouts
    #[error("Price source unreachable: {0}")]
    Unreachable(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("Price source responded with status {0}")]
    Status(u16),

    /// Body could not be interpreted as an instrument list
    #[error("Malformed price source payload: {0}")]
    Payload(String),
}

/// Repository-specific error types
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Database query error
    #[error("Query error: {0}")]
    Query(SqlxError),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Duplicate record
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    /// Constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Store could not be reached or rejected the operation
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl RepositoryError {
    /// Check if the error means "no such record"
    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound(_))
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => AppError::NotFound(msg),
            RepositoryError::ConstraintViolation(msg) => AppError::Validation(msg),
            RepositoryError::InvalidInput(msg) => AppError::Validation(msg),
            other => AppError::Repository(other),
        }
    }
}

impl From<SqlxError> for RepositoryError {
    fn from(err: SqlxError) -> Self {
        if let SqlxError::Database(db_err) = &err {
            let message = db_err.message().to_string();
            match db_err.code().as_deref() {
                // Unique violation
                Some("23505") => return RepositoryError::Duplicate(message),
                // Foreign key and check violations
                Some("23503") | Some("23514") => {
                    return RepositoryError::ConstraintViolation(message)
                }
                _ => {}
            }
        }

        match err {
            SqlxError::RowNotFound => RepositoryError::NotFound("Record not found".to_string()),
            SqlxError::PoolTimedOut | SqlxError::PoolClosed | SqlxError::Io(_) => {
                RepositoryError::Unavailable(err.to_string())
            }
            other => RepositoryError::Query(other),
        }
    }
}
