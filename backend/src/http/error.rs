//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::repository::RepositoryError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    BadRequest(String),
    /// A request that collides with existing state, with its error code.
    Conflict { code: &'static str, message: String },
    Repository(RepositoryError),
}

impl AppError {
    /// Turn a storage uniqueness failure into a conflict carrying `code`,
    /// passing every other error through unchanged.
    pub fn conflict_on_unique(code: &'static str) -> impl FnOnce(RepositoryError) -> AppError {
        move |err| {
            if err.is_unique_violation() {
                AppError::Conflict {
                    code,
                    message: err.to_string(),
                }
            } else {
                AppError::Repository(err)
            }
        }
    }
}

fn repository_response(err: RepositoryError) -> (StatusCode, ApiError) {
    let message = err.to_string();
    let details = err.context().to_string();
    let (status, code) = match &err {
        RepositoryError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        RepositoryError::UniqueViolation { .. } => (StatusCode::CONFLICT, "CONFLICT"),
        RepositoryError::ValidationError { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        RepositoryError::ConnectionError { .. } => {
            (StatusCode::SERVICE_UNAVAILABLE, "DATABASE_UNAVAILABLE")
        }
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "REPOSITORY_ERROR"),
    };
    (status, ApiError::new(code, message).with_details(details))
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ApiError::new("NOT_FOUND", msg)),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg))
            }
            AppError::Conflict { code, message } => {
                (StatusCode::CONFLICT, ApiError::new(code, message))
            }
            AppError::Repository(e) => {
                if e.is_retryable() {
                    tracing::warn!("Transient repository failure: {}", e);
                } else if !(e.is_not_found() || e.is_unique_violation()) {
                    tracing::error!("Repository failure: {}", e);
                }
                repository_response(e)
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Repository(err)
    }
}
