use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Rejections raised while checking query or body fields.
///
/// The messages are part of the HTTP contract and are sent verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid Todo Status")]
    InvalidStatus,

    #[error("Invalid Todo Priority")]
    InvalidPriority,

    #[error("Invalid Todo Category")]
    InvalidCategory,

    #[error("Invalid Due Date")]
    InvalidDueDate,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Query extraction error: {0}")]
    QueryExtractorRejection(#[from] QueryRejection),

    #[error("Path extraction error: {0}")]
    PathExtractorRejection(#[from] PathRejection),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

impl AppError {
    /// Maps a failed insert, turning a primary key collision into a conflict.
    pub fn from_insert(err: sqlx::Error, id: i64) -> Self {
        match err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(format!("Todo {} already exists", id))
            }
            other => AppError::Database(other),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Validation(err) => {
                return (StatusCode::BAD_REQUEST, err.to_string()).into_response();
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::JsonExtractorRejection(rejection) => {
                (StatusCode::BAD_REQUEST, rejection.body_text())
            }
            AppError::QueryExtractorRejection(rejection) => {
                (StatusCode::BAD_REQUEST, rejection.body_text())
            }
            AppError::PathExtractorRejection(rejection) => {
                (StatusCode::BAD_REQUEST, rejection.body_text())
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Database(e) => {
                error!("database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            message: error_message,
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_are_fixed() {
        assert_eq!(ValidationError::InvalidStatus.to_string(), "Invalid Todo Status");
        assert_eq!(ValidationError::InvalidPriority.to_string(), "Invalid Todo Priority");
        assert_eq!(ValidationError::InvalidCategory.to_string(), "Invalid Todo Category");
        assert_eq!(ValidationError::InvalidDueDate.to_string(), "Invalid Due Date");
    }

    #[test]
    fn validation_error_is_bad_request() {
        let response = AppError::from(ValidationError::InvalidStatus).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn non_unique_insert_failure_stays_database_error() {
        let err = AppError::from_insert(sqlx::Error::RowNotFound, 1);
        assert!(matches!(err, AppError::Database(_)));
    }
}
