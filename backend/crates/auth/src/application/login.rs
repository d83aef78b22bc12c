//! Login Use Case
//!
//! Verifies email + password and issues a token pair.

use std::sync::Arc;

use platform::password::ClearTextPassword;

use crate::application::{tokens::TokenManager, AuthOutput};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

pub struct LoginInput {
    pub email: String,
    pub password: String,
}

pub struct LoginUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    tokens: Arc<TokenManager>,
}

impl<U> LoginUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, tokens: Arc<TokenManager>) -> Self {
        Self { user_repo, tokens }
    }

    /// Unknown email and wrong password are indistinguishable to the caller.
    /// The blocked flag is only revealed after the password checks out.
    pub async fn execute(&self, input: LoginInput) -> AuthResult<AuthOutput> {
        let email = Email::new(input.email)?;
        if input.password.is_empty() {
            return Err(AuthError::Validation("password is required".to_string()));
        }

        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let password = ClearTextPassword::for_verification(&input.password);
        if !user.password_hash.verify(&password) {
            return Err(AuthError::InvalidCredentials);
        }

        if user.is_blocked {
            return Err(AuthError::UserBlocked);
        }

        let tokens = self.tokens.issue_pair(&user)?;

        tracing::info!(user_id = %user.user_id, role = %user.role, "User logged in");

        Ok(AuthOutput { tokens, user })
    }
}
