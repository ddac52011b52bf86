//! Error types for garden record operations.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::ValidationError;

/// Errors that can occur during data store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataStoreError {
    /// The requested row was not found in the data store.
    #[error("item not found in data store")]
    NotFound,
    /// A write referenced a parent row that does not exist.
    #[error("referenced record does not exist ({0})")]
    MissingReference(String),
    /// A delete was refused because other rows still reference the target.
    #[error("record is still referenced ({0})")]
    InUse(String),
    /// A stored row no longer passes validation.
    #[error("stored record is corrupt: {0}")]
    Corrupt(String),
    /// An internal storage system error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl DataStoreError {
    /// Maps a failed DELETE, where a foreign-key violation means the row is still in use.
    pub fn from_delete(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                Self::InUse(db_err.constraint().unwrap_or("foreign key").to_string())
            }
            other => other.into(),
        }
    }
}

impl From<sqlx::Error> for DataStoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => DataStoreError::NotFound,
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                DataStoreError::MissingReference(
                    db_err.constraint().unwrap_or("foreign key").to_string(),
                )
            }
            _ => DataStoreError::Internal(e.to_string()),
        }
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// No record with the given identifier exists.
    #[error("{resource} {id} not found")]
    NotFound {
        /// The kind of record that was looked up.
        resource: &'static str,
        /// The identifier that was looked up.
        id: i64,
    },
    /// The data store failed.
    #[error(transparent)]
    Store(#[from] DataStoreError),
    /// The request body was not a JSON document.
    #[error("{0}")]
    Body(#[from] JsonRejection),
    /// A path parameter did not parse into its expected type.
    #[error("{0}")]
    Path(#[from] PathRejection),
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        Self::Store(e.into())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Body(_) | Self::Path(_) => StatusCode::BAD_REQUEST,
            Self::NotFound { .. } | Self::Store(DataStoreError::NotFound) => StatusCode::NOT_FOUND,
            Self::Store(DataStoreError::MissingReference(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Store(DataStoreError::InUse(_)) => StatusCode::CONFLICT,
            Self::Store(DataStoreError::Corrupt(_) | DataStoreError::Internal(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(e) => e.code(),
            Self::Body(_) | Self::Path(_) => "INVALID_TYPE",
            Self::NotFound { .. } | Self::Store(DataStoreError::NotFound) => "NOT_FOUND",
            Self::Store(DataStoreError::MissingReference(_)) => "MISSING_REFERENCE",
            Self::Store(DataStoreError::InUse(_)) => "IN_USE",
            Self::Store(DataStoreError::Corrupt(_)) => "CORRUPT_RECORD",
            Self::Store(DataStoreError::Internal(_)) => "INTERNAL_ERROR",
        }
    }
}

/// API error response body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Error code for programmatic handling plus a human-readable message.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code(),
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_is_bad_request() {
        let err = ApiError::from(ValidationError::EmptySchedule);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "EMPTY_SCHEDULE");
    }

    #[test]
    fn store_errors_map_to_statuses() {
        assert_eq!(
            ApiError::from(DataStoreError::MissingReference("fk".into())).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::from(DataStoreError::InUse("fk".into())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(DataStoreError::Corrupt("bad row".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::NotFound {
                resource: "plant",
                id: 4
            }
            .to_string(),
            "plant 4 not found"
        );
    }

    #[test]
    fn row_not_found_is_not_found() {
        assert_eq!(
            DataStoreError::from(sqlx::Error::RowNotFound),
            DataStoreError::NotFound
        );
    }
}
