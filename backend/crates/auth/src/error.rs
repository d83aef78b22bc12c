//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::application::tokens::TokenError;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Column protected by a unique constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Email,
    ReferralCode,
}

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed or missing input
    #[error("{0}")]
    Validation(String),

    #[error("missing authorization header")]
    MissingAuthorization,

    #[error("invalid authorization format")]
    InvalidAuthorizationFormat,

    #[error("invalid token")]
    InvalidToken,

    #[error("token expired")]
    ExpiredToken,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("invalid or expired refresh token")]
    InvalidRefreshToken,

    /// Role mismatch
    #[error("forbidden")]
    Forbidden,

    #[error("user account is blocked")]
    UserBlocked,

    #[error("user not found")]
    UserNotFound,

    #[error("email already exists")]
    EmailTaken,

    /// Unique constraint violated at the persistence layer
    #[error("duplicate value for {0:?}")]
    Duplicate(UniqueField),

    #[error("invalid or expired reset token")]
    InvalidResetToken,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Validation(_) | AuthError::InvalidResetToken => ErrorKind::BadRequest,
            AuthError::MissingAuthorization
            | AuthError::InvalidAuthorizationFormat
            | AuthError::InvalidToken
            | AuthError::ExpiredToken
            | AuthError::InvalidCredentials
            | AuthError::InvalidRefreshToken => ErrorKind::Unauthorized,
            AuthError::Forbidden | AuthError::UserBlocked => ErrorKind::Forbidden,
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::EmailTaken | AuthError::Duplicate(_) => ErrorKind::Conflict,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::Duplicate(UniqueField::Email) => AppError::conflict("email already exists"),
            AuthError::Duplicate(UniqueField::ReferralCode) => {
                AppError::conflict("referral code already exists")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::UserBlocked => {
                tracing::warn!("Blocked user attempted to authenticate");
            }
            AuthError::InvalidToken | AuthError::InvalidRefreshToken => {
                tracing::warn!(error = %self, "Rejected bearer token");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::BadRequest => AuthError::Validation(err.message().to_string()),
            _ => AuthError::Internal(err.to_string()),
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AuthError::ExpiredToken,
            TokenError::Invalid => AuthError::InvalidToken,
            TokenError::Signing(msg) => AuthError::Internal(msg),
        }
    }
}

impl From<platform::password::PasswordPolicyError> for AuthError {
    fn from(err: platform::password::PasswordPolicyError) -> Self {
        AuthError::Validation(err.to_string())
    }
}

impl From<platform::password::PasswordHashError> for AuthError {
    fn from(err: platform::password::PasswordHashError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

/// Map a sqlx error, turning unique violations into [`AuthError::Duplicate`]
pub(crate) fn map_write_error(err: sqlx::Error) -> AuthError {
    match kernel::error::conversions::unique_violation(&err).as_deref() {
        Some("users_email_key") => AuthError::Duplicate(UniqueField::Email),
        Some("users_referral_code_key") => AuthError::Duplicate(UniqueField::ReferralCode),
        _ => AuthError::Database(err),
    }
}
