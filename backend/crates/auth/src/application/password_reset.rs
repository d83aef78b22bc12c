//! Password Reset Use Cases
//!
//! - forgot: mail a single-use reset link; same outcome whether or not the
//!   email exists
//! - reset: redeem the link and set a new password

use std::sync::Arc;

use chrono::Utc;
use platform::mail::Mailer;
use platform::password::ClearTextPassword;

use crate::application::{config::AuthConfig, emails};
use crate::domain::entity::reset_token::PasswordResetToken;
use crate::domain::repository::{ResetTokenRepository, UserRepository};
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

pub struct ForgotPasswordUseCase<R>
where
    R: UserRepository + ResetTokenRepository,
{
    repo: Arc<R>,
    mailer: Mailer,
    config: Arc<AuthConfig>,
}

impl<R> ForgotPasswordUseCase<R>
where
    R: UserRepository + ResetTokenRepository,
{
    pub fn new(repo: Arc<R>, mailer: Mailer, config: Arc<AuthConfig>) -> Self {
        Self {
            repo,
            mailer,
            config,
        }
    }

    /// Only a malformed email is reported. Lookup and storage failures are
    /// logged and swallowed so the response cannot reveal account existence.
    pub async fn execute(&self, email: String) -> AuthResult<()> {
        let email = Email::new(email)?;

        let user = match UserRepository::find_by_email(self.repo.as_ref(), &email).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                tracing::debug!("Password reset requested for unknown email");
                return Ok(());
            }
            Err(e) => {
                tracing::error!(error = %e, "Password reset lookup failed");
                return Ok(());
            }
        };

        let (token, raw) = PasswordResetToken::issue(user.user_id, self.config.reset_token_ttl());

        if let Err(e) = self.repo.replace_for_user(&token).await {
            tracing::error!(error = %e, user_id = %user.user_id, "Failed to store reset token");
            return Ok(());
        }

        self.mailer
            .dispatch(emails::password_reset(&user, &self.config.reset_link(&raw)));

        tracing::info!(user_id = %user.user_id, "Password reset link issued");
        Ok(())
    }
}

pub struct ResetPasswordInput {
    pub token: String,
    pub new_password: String,
}

pub struct ResetPasswordUseCase<R>
where
    R: UserRepository + ResetTokenRepository,
{
    repo: Arc<R>,
}

impl<R> ResetPasswordUseCase<R>
where
    R: UserRepository + ResetTokenRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, input: ResetPasswordInput) -> AuthResult<()> {
        if input.token.trim().is_empty() {
            return Err(AuthError::Validation("token is required".to_string()));
        }
        let password = ClearTextPassword::new(input.new_password)?;

        let digest = PasswordResetToken::digest(&input.token);
        let token = self
            .repo
            .find_valid(&digest, Utc::now())
            .await?
            .ok_or(AuthError::InvalidResetToken)?;

        let mut user = UserRepository::find_by_id(self.repo.as_ref(), &token.user_id)
            .await?
            .ok_or(AuthError::InvalidResetToken)?;

        user.set_password(password.hash()?);
        self.repo.update_password(&user).await?;

        self.repo.delete_by_digest(&digest).await?;
        self.repo.delete_for_user(&user.user_id).await?;

        tracing::info!(user_id = %user.user_id, "Password reset completed");
        Ok(())
    }
}
