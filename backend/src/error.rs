//! Application error handling
//!
//! This module provides unified error handling for the API,
//! converting internal errors to appropriate HTTP responses.
//! Client-facing messages stay generic; causes go to the log.

use crate::auth::Forbidden;
use crate::repositories::StoreError;
use authgate_shared::{AuthError, ErrorDetail, ErrorResponse};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::{error, warn};

/// Message returned for every rejected token, whatever the cause.
pub const INVALID_TOKEN_MESSAGE: &str = "invalid or expired token";

/// API error type that can be converted to HTTP responses
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    InputInvalid(String),

    #[error("Duplicate email or phone")]
    DuplicateCredentialTarget,

    #[error("Credential mismatch")]
    CredentialMismatch,

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Store timed out")]
    StoreTimeout,

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(_) => ApiError::DuplicateCredentialTarget,
            StoreError::Timeout(_) => ApiError::StoreTimeout,
            StoreError::Unavailable(msg) => ApiError::StoreUnavailable(msg),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken => ApiError::Unauthenticated("No token header provided".to_string()),
            AuthError::Token(_) => ApiError::Unauthenticated(INVALID_TOKEN_MESSAGE.to_string()),
            AuthError::SigningFailure(_) | AuthError::HashingFailure(_) => {
                ApiError::Internal(anyhow::Error::new(err))
            }
        }
    }
}

impl From<Forbidden> for ApiError {
    fn from(_: Forbidden) -> Self {
        ApiError::Forbidden
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::InputInvalid(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::InputInvalid(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            ApiError::DuplicateCredentialTarget => (
                StatusCode::BAD_REQUEST,
                "DUPLICATE_CREDENTIAL_TARGET",
                "this email or phone number already exists".to_string(),
            ),
            ApiError::CredentialMismatch => (
                StatusCode::BAD_REQUEST,
                "CREDENTIAL_MISMATCH",
                "email or password is incorrect".to_string(),
            ),
            ApiError::Unauthenticated(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", msg.clone()),
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Unauthorized to access this resource".to_string(),
            ),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            ApiError::StoreUnavailable(cause) => {
                warn!("User store unavailable: {}", cause);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "STORE_UNAVAILABLE",
                    "The user store is unavailable".to_string(),
                )
            }
            ApiError::StoreTimeout => {
                warn!("User store call exceeded its deadline");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "STORE_TIMEOUT",
                    "The user store did not respond in time".to_string(),
                )
            }
            ApiError::Internal(err) => {
                error!("Internal error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                field: None,
            },
        });

        (status, body).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
