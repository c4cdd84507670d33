//! Error types surfaced by the catalog API
//!
//! [`AppError`] is what handlers return; it maps onto an HTTP status and a
//! `{"error": ..., "code": ...}` body. Storage failures are wrapped in
//! [`StoreError`] so the database layer does not leak redb types upwards.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Failure of the embedded database or of the JSON encoding of a record
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] redb::Error),

    #[error("record encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

// redb reports each phase of a transaction with its own error type; funnel
// them all through `redb::Error` so `?` works inside the store.
macro_rules! store_error_from_redb {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for StoreError {
                fn from(err: $ty) -> Self {
                    StoreError::Database(err.into())
                }
            }
        )*
    };
}

store_error_from_redb!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);

/// Errors returned by the catalog operations and HTTP handlers
#[derive(Debug, Error)]
pub enum AppError {
    /// A required field is missing or a request tried to clear it
    #[error("{0}")]
    Validation(String),

    /// The targeted record does not exist (or is hidden from the caller)
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Click tracking was asked for a link position the movie does not have
    #[error("Invalid link index")]
    InvalidLinkIndex,

    /// The backing store rejected a read or the final commit
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::InvalidLinkIndex => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation_error",
            AppError::NotFound(_) => "not_found",
            AppError::InvalidLinkIndex => "invalid_link_index",
            AppError::Storage(_) => "storage_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(status = %status, error = %self, "request failed");
        }

        (
            status,
            Json(json!({
                "error": self.to_string(),
                "code": self.code(),
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_produces_404() {
        let response = AppError::NotFound("Movie").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn validation_keeps_message() {
        let err = AppError::validation("Movie name is required");
        assert_eq!(err.to_string(), "Movie name is required");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn storage_errors_are_server_errors() {
        let bad_json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = AppError::from(StoreError::from(bad_json));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "storage_error");
    }
}
