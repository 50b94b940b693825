//! HTTP error taxonomy.
//!
//! Every handler returns `Result<_, ApiError>`. Validation and authorization failures
//! are raised locally and terminate the request immediately; store and file failures
//! bubble up through `From` conversions and are reported as a bare 500.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    password::PasswordError, repository::RepositoryError, storage::StorageError,
    token::TokenError,
};

pub type ApiResult<T> = Result<T, ApiError>;

/// ApiError
///
/// The five outcomes a client can observe besides success. Bodies are always a
/// JSON string; internal detail only reaches the logs.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("unhandled: {0}")]
    Unhandled(String),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unhandled(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            ApiError::Unhandled(detail) => {
                tracing::error!(error = %detail, "Unhandled request failure");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        ApiError::Unhandled(err.to_string())
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ApiError::Unhandled(err.to_string())
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::Unhandled(err.to_string())
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Encoding(detail) => ApiError::Unhandled(detail),
            cause => {
                // The cause is never surfaced to the caller.
                tracing::debug!(%cause, "Token rejected");
                ApiError::Unauthorized
            }
        }
    }
}
