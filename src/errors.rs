use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::{domain::validation::FieldErrors, storage::StorageError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed on {} field(s)", .0.len())]
    Validation(FieldErrors),
    #[error("{message}")]
    NotFound { message: String },
    #[error("{message}")]
    BadRequest { message: String },
    #[error("{message}")]
    Internal { message: String },
}

impl AppError {
    pub fn validation(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { .. } => Self::not_found(err.to_string()),
            other => Self::internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
            // Missing artifacts are reported as 400, not 404.
            Self::NotFound { message } | Self::BadRequest { message } => {
                (StatusCode::BAD_REQUEST, message).into_response()
            }
            Self::Internal { message } => {
                tracing::error!(error = %message, "request failed with internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn storage_not_found_maps_to_not_found() {
        let err = AppError::from(StorageError::NotFound {
            path: "data/x.body".to_string(),
            source: io::Error::from(io::ErrorKind::NotFound),
        });
        assert!(matches!(err, AppError::NotFound { .. }));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn storage_io_failure_maps_to_internal() {
        let err = AppError::from(StorageError::Io {
            action: "write",
            path: "data/x.body".to_string(),
            source: io::Error::other("disk full"),
        });
        assert!(err.to_string().contains("disk full"));
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn validation_is_bad_request() {
        let mut errors = FieldErrors::new();
        errors.insert("uri".to_string(), "uri is required".to_string());
        let response = AppError::validation(errors).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
