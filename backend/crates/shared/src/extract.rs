//! Request extractors
//!
//! axum's own rejections answer with `text/plain`; these wrappers turn them
//! into [`AppError`] so every 4xx carries the JSON error body.

use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use crate::error::app_error::AppError;

/// JSON body extractor with JSON error responses
///
/// ```rust,ignore
/// async fn login(ApiJson(req): ApiJson<LoginRequest>) -> AuthResult<Json<AuthResponse>> { .. }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(axum::Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!(reason = %rejection.body_text(), "Rejected request body");
                Err(AppError::bad_request("invalid request body").with_detail(rejection.body_text()))
            }
        }
    }
}
