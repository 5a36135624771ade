//! API error types with JSON error bodies.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::core_state::CoreError;
use crate::db::DatabaseError;
use crate::suggest::SuggestError;

/// Error body returned to clients: `{"error": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Query parameter is required")]
    MissingQuery,
    #[error("Medicine catalog unavailable: {0}")]
    CatalogUnavailable(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::MissingQuery => (
                StatusCode::BAD_REQUEST,
                "Query parameter is required".to_string(),
            ),
            ApiError::CatalogUnavailable(detail) => {
                tracing::error!(%detail, "Suggestion request failed: catalog unavailable");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Medicine catalog unavailable".to_string(),
                )
            }
            ApiError::Internal(detail) => {
                tracing::error!(%detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::CatalogUnavailable(reason) => ApiError::CatalogUnavailable(reason),
            CoreError::Database(e) => e.into(),
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        ApiError::CatalogUnavailable(err.to_string())
    }
}

impl From<SuggestError> for ApiError {
    fn from(err: SuggestError) -> Self {
        match err {
            SuggestError::MissingQuery => ApiError::MissingQuery,
            SuggestError::Database(e) => e.into(),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(format!("request worker failed: {err}"))
    }
}
