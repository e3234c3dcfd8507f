//! Access API error types.
//!
//! Maps internal failures to HTTP responses. The login endpoint answers
//! every failure with 401 and the fixed message; only pre-authentication
//! errors from `auth-url` carry detail to the caller.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rg_auth::LoginError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors rendered by the access API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request parameters failed verification.
    #[error("parameter verification failed: {0}")]
    Validation(String),

    /// Realm lookup failed during `auth-url`.
    #[error("{0}")]
    Realm(String),

    /// The OpenID provider could not be reached or discovered.
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The fixed answer of a failed login.
    #[error("authentication failure")]
    Unauthorized,

    /// Anything the caller cannot act on.
    #[error("internal error")]
    Internal(String),
}

impl ApiError {
    /// The HTTP status this error renders as.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Realm(_) => StatusCode::BAD_REQUEST,
            Self::ProviderUnavailable(_) => StatusCode::BAD_GATEWAY,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<LoginError> for ApiError {
    fn from(err: LoginError) -> Self {
        match err {
            LoginError::AuthenticationFailure => Self::Unauthorized,
            LoginError::Storage(
                storage_err @ (rg_storage::StorageError::UnknownRealm(_)
                | rg_storage::StorageError::WrongRealmType { .. }),
            ) => Self::Realm(storage_err.to_string()),
            LoginError::OpenId(rg_openid::OpenIdError::ProviderUnavailable(detail)) => {
                Self::ProviderUnavailable(detail)
            }
            LoginError::OpenId(
                redirect_err @ rg_openid::OpenIdError::InvalidRedirectUrl(_),
            ) => Self::Validation(redirect_err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message. For a failed login this is exactly
    /// `authentication failure`.
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            if let Self::Internal(detail) = &self {
                tracing::error!(%detail, "internal error on access api");
            }
        }
        let body = ErrorBody {
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type for access API handlers.
pub type ApiResult<T> = Result<T, ApiError>;
