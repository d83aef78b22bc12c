//! Refresh Use Case
//!
//! Exchanges a valid refresh token for a new token pair. The user is
//! re-read so role changes and blocks take effect on the next refresh.

use std::sync::Arc;

use crate::application::{tokens::TokenManager, AuthOutput};
use crate::domain::repository::UserRepository;
use crate::error::{AuthError, AuthResult};

pub struct RefreshUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    tokens: Arc<TokenManager>,
}

impl<U> RefreshUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, tokens: Arc<TokenManager>) -> Self {
        Self { user_repo, tokens }
    }

    pub async fn execute(&self, refresh_token: &str) -> AuthResult<AuthOutput> {
        let refresh_token = refresh_token.trim();
        if refresh_token.is_empty() {
            return Err(AuthError::Validation("refresh_token is required".to_string()));
        }

        let claims = self
            .tokens
            .validate_refresh_token(refresh_token)
            .map_err(|_| AuthError::InvalidRefreshToken)?;

        let user = self
            .user_repo
            .find_by_id(&claims.user_id)
            .await?
            .ok_or(AuthError::InvalidRefreshToken)?;

        if user.is_blocked {
            return Err(AuthError::UserBlocked);
        }

        let tokens = self.tokens.issue_pair(&user)?;

        tracing::debug!(user_id = %user.user_id, "Tokens refreshed");

        Ok(AuthOutput { tokens, user })
    }
}
