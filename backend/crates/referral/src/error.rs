//! Referral Error Types
//!
//! Referral-specific error variants that integrate with the unified
//! `kernel::error::AppError` system. Auth failures raised while resolving
//! users pass through unchanged.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use auth::AuthError;
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Referral-specific result type alias
pub type ReferralResult<T> = Result<T, ReferralError>;

/// Why a third-party call failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamFailure {
    /// The provider answered and refused the request
    Rejected(String),
    /// Transport error, bad status, or unreadable body
    Unavailable(String),
}

/// Referral-specific error variants
#[derive(Debug, Error)]
pub enum ReferralError {
    /// Malformed or missing input
    #[error("{0}")]
    Validation(String),

    #[error("referral not found")]
    ReferralNotFound,

    #[error("payout not found")]
    PayoutNotFound,

    #[error("user not found")]
    UserNotFound,

    #[error("referral already {0}")]
    ReferralAlreadyDecided(String),

    #[error("payout already {0}")]
    PayoutAlreadyDecided(String),

    #[error("insufficient balance")]
    InsufficientBalance { available: i64 },

    #[error("bank details are required before requesting a payout")]
    BankDetailsRequired,

    #[error("cannot block yourself")]
    CannotBlockSelf,

    #[error("bank service error: {0:?}")]
    Upstream(UpstreamFailure),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ReferralError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReferralError::Validation(_)
            | ReferralError::InsufficientBalance { .. }
            | ReferralError::BankDetailsRequired
            | ReferralError::CannotBlockSelf
            | ReferralError::Upstream(UpstreamFailure::Rejected(_)) => ErrorKind::BadRequest,
            ReferralError::ReferralNotFound
            | ReferralError::PayoutNotFound
            | ReferralError::UserNotFound => ErrorKind::NotFound,
            ReferralError::ReferralAlreadyDecided(_) | ReferralError::PayoutAlreadyDecided(_) => {
                ErrorKind::Conflict
            }
            ReferralError::Upstream(UpstreamFailure::Unavailable(_)) => ErrorKind::BadGateway,
            ReferralError::Auth(e) => e.kind(),
            ReferralError::Database(_) | ReferralError::Internal(_) => {
                ErrorKind::InternalServerError
            }
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        match self {
            ReferralError::Auth(e) => e.to_app_error(),
            ReferralError::InsufficientBalance { available } => {
                AppError::bad_request("insufficient balance")
                    .with_detail(format!("available balance is {}", available))
            }
            ReferralError::Upstream(UpstreamFailure::Rejected(message)) => {
                AppError::bad_request(message.clone())
            }
            ReferralError::Upstream(UpstreamFailure::Unavailable(_)) => {
                AppError::bad_gateway("bank service unavailable")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            ReferralError::Database(e) => {
                tracing::error!(error = %e, "Referral database error");
            }
            ReferralError::Internal(msg) => {
                tracing::error!(message = %msg, "Referral internal error");
            }
            ReferralError::Upstream(failure) => {
                tracing::warn!(failure = ?failure, "Bank service call failed");
            }
            _ => {
                tracing::debug!(error = %self, "Referral error");
            }
        }
    }
}

impl IntoResponse for ReferralError {
    fn into_response(self) -> Response {
        match self {
            // AuthError owns its logging
            ReferralError::Auth(e) => e.into_response(),
            other => {
                other.log();
                other.to_app_error().into_response()
            }
        }
    }
}

impl From<AppError> for ReferralError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::BadRequest => ReferralError::Validation(err.message().to_string()),
            _ => ReferralError::Internal(err.to_string()),
        }
    }
}
