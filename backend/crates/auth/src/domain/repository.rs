//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use chrono::{DateTime, Utc};

use crate::domain::entity::{reset_token::PasswordResetToken, user::User};
use crate::domain::value_object::{email::Email, referral_code::ReferralCode, user_id::UserId};
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Create a new user
    ///
    /// Fails with `AuthError::Duplicate` when the email or referral code is taken.
    async fn create(&self, user: &User) -> AuthResult<()>;

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    async fn find_by_referral_code(&self, code: &ReferralCode) -> AuthResult<Option<User>>;

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    async fn exists_by_referral_code(&self, code: &ReferralCode) -> AuthResult<bool>;

    /// Persist name, phone and bank details
    async fn update_profile(&self, user: &User) -> AuthResult<()>;

    async fn update_password(&self, user: &User) -> AuthResult<()>;

    /// Returns `false` when the user does not exist
    async fn set_blocked(&self, user_id: &UserId, blocked: bool) -> AuthResult<bool>;
}

/// Password reset token repository trait
#[trait_variant::make(ResetTokenRepository: Send)]
pub trait LocalResetTokenRepository {
    /// Delete the user's prior tokens, then store this one
    async fn replace_for_user(&self, token: &PasswordResetToken) -> AuthResult<()>;

    /// Find an unexpired token by digest
    async fn find_valid(
        &self,
        token_digest: &str,
        now: DateTime<Utc>,
    ) -> AuthResult<Option<PasswordResetToken>>;

    async fn delete_by_digest(&self, token_digest: &str) -> AuthResult<()>;

    async fn delete_for_user(&self, user_id: &UserId) -> AuthResult<u64>;

    /// Delete expired tokens, returning how many were removed
    async fn cleanup_expired(&self, now: DateTime<Utc>) -> AuthResult<u64>;
}

/// Everything the auth handlers need from storage
pub trait AuthStore: UserRepository + ResetTokenRepository + Clone + Send + Sync + 'static {}

impl<T> AuthStore for T where T: UserRepository + ResetTokenRepository + Clone + Send + Sync + 'static {}
