use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::documents::DocumentError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Session limit: {0}")]
    SessionLimit(String),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::SessionLimit(msg) => (StatusCode::CONFLICT, "SESSION_LIMIT", msg.clone()),
            AppError::Document(e) => match e {
                DocumentError::UnsupportedFormat(_) => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "UNSUPPORTED_FORMAT",
                    e.to_string(),
                ),
                DocumentError::Read(_) => {
                    tracing::error!("Document error: {e}");
                    (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        "DOCUMENT_ERROR",
                        "The uploaded document could not be read".to_string(),
                    )
                }
            },
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let response = AppError::NotFound("session abc".to_owned()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_session_limit_maps_to_409() {
        let response = AppError::SessionLimit("interaction cap reached".to_owned()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_unsupported_format_maps_to_422() {
        let response =
            AppError::Document(DocumentError::UnsupportedFormat("txt".to_owned())).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
