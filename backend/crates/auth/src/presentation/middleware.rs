//! Auth Middleware
//!
//! Two stages, applied in order on protected routes:
//! 1. [`require_bearer`] validates `Authorization: Bearer <access token>` and
//!    stores the [`Claims`] in request extensions
//! 2. [`require_role`] compares `claims.role` with the route's role for
//!    exact equality (no hierarchy)

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;

use crate::application::{Claims, TokenManager};
use crate::domain::value_object::user_role::UserRole;
use crate::error::AuthError;

/// Pull the token out of an `Authorization` header value
pub fn bearer_token(value: &str) -> Result<&str, AuthError> {
    let (scheme, token) = value
        .split_once(' ')
        .ok_or(AuthError::InvalidAuthorizationFormat)?;

    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AuthError::InvalidAuthorizationFormat);
    }

    Ok(token)
}

/// Middleware that requires a valid access token
pub async fn require_bearer(
    State(tokens): State<Arc<TokenManager>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingAuthorization)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthorizationFormat)?;

    let claims = tokens.validate_access_token(bearer_token(value)?)?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Middleware that requires the authenticated user to hold exactly `role`
///
/// Must run after [`require_bearer`].
pub async fn require_role(
    State(role): State<UserRole>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let claims = req
        .extensions()
        .get::<Claims>()
        .ok_or(AuthError::MissingAuthorization)?;

    if claims.role != role {
        tracing::debug!(user_id = %claims.user_id, have = %claims.role, need = %role, "Role mismatch");
        return Err(AuthError::Forbidden);
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc.def").unwrap(), "abc.def");
        assert_eq!(bearer_token("bearer abc").unwrap(), "abc");
        assert!(matches!(bearer_token("Bearer"), Err(AuthError::InvalidAuthorizationFormat)));
        assert!(matches!(bearer_token("Bearer   "), Err(AuthError::InvalidAuthorizationFormat)));
        assert!(matches!(bearer_token("Basic abc"), Err(AuthError::InvalidAuthorizationFormat)));
    }
}
