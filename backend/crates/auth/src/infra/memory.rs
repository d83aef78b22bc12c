//! In-memory Repository Implementation
//!
//! HashMap-backed store behind a `tokio::sync::RwLock`, for tests and local
//! runs without PostgreSQL. Unique constraints are checked under the write
//! lock, so concurrent inserts behave like the database.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::entity::{reset_token::PasswordResetToken, user::User};
use crate::domain::repository::{ResetTokenRepository, UserRepository};
use crate::domain::value_object::{email::Email, referral_code::ReferralCode, user_id::UserId};
use crate::error::{AuthError, AuthResult, UniqueField};

#[derive(Default)]
struct State {
    users: HashMap<UserId, User>,
    reset_tokens: Vec<PasswordResetToken>,
}

#[derive(Clone, Default)]
pub struct MemoryAuthRepository {
    state: Arc<RwLock<State>>,
}

impl MemoryAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored user
    pub async fn all_users(&self) -> Vec<User> {
        self.state.read().await.users.values().cloned().collect()
    }

    pub async fn reset_token_count(&self) -> usize {
        self.state.read().await.reset_tokens.len()
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for MemoryAuthRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        let mut state = self.state.write().await;

        if state.users.values().any(|u| u.email == user.email) {
            return Err(AuthError::Duplicate(UniqueField::Email));
        }
        if state
            .users
            .values()
            .any(|u| u.referral_code == user.referral_code)
        {
            return Err(AuthError::Duplicate(UniqueField::ReferralCode));
        }

        state.users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        Ok(self.state.read().await.users.get(user_id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        Ok(self
            .state
            .read()
            .await
            .users
            .values()
            .find(|u| &u.email == email)
            .cloned())
    }

    async fn find_by_referral_code(&self, code: &ReferralCode) -> AuthResult<Option<User>> {
        Ok(self
            .state
            .read()
            .await
            .users
            .values()
            .find(|u| &u.referral_code == code)
            .cloned())
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        Ok(self
            .state
            .read()
            .await
            .users
            .values()
            .any(|u| &u.email == email))
    }

    async fn exists_by_referral_code(&self, code: &ReferralCode) -> AuthResult<bool> {
        Ok(self
            .state
            .read()
            .await
            .users
            .values()
            .any(|u| &u.referral_code == code))
    }

    async fn update_profile(&self, user: &User) -> AuthResult<()> {
        if let Some(stored) = self.state.write().await.users.get_mut(&user.user_id) {
            stored.name = user.name.clone();
            stored.phone = user.phone.clone();
            stored.bank = user.bank.clone();
            stored.updated_at = user.updated_at;
        }
        Ok(())
    }

    async fn update_password(&self, user: &User) -> AuthResult<()> {
        if let Some(stored) = self.state.write().await.users.get_mut(&user.user_id) {
            stored.password_hash = user.password_hash.clone();
            stored.updated_at = user.updated_at;
        }
        Ok(())
    }

    async fn set_blocked(&self, user_id: &UserId, blocked: bool) -> AuthResult<bool> {
        match self.state.write().await.users.get_mut(user_id) {
            Some(user) => {
                user.set_blocked(blocked);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

// ============================================================================
// Reset Token Repository Implementation
// ============================================================================

impl ResetTokenRepository for MemoryAuthRepository {
    async fn replace_for_user(&self, token: &PasswordResetToken) -> AuthResult<()> {
        let mut state = self.state.write().await;
        state.reset_tokens.retain(|t| t.user_id != token.user_id);
        state.reset_tokens.push(token.clone());
        Ok(())
    }

    async fn find_valid(
        &self,
        token_digest: &str,
        now: DateTime<Utc>,
    ) -> AuthResult<Option<PasswordResetToken>> {
        Ok(self
            .state
            .read()
            .await
            .reset_tokens
            .iter()
            .find(|t| t.token_digest == token_digest && !t.is_expired_at(now))
            .cloned())
    }

    async fn delete_by_digest(&self, token_digest: &str) -> AuthResult<()> {
        self.state
            .write()
            .await
            .reset_tokens
            .retain(|t| t.token_digest != token_digest);
        Ok(())
    }

    async fn delete_for_user(&self, user_id: &UserId) -> AuthResult<u64> {
        let mut state = self.state.write().await;
        let before = state.reset_tokens.len();
        state.reset_tokens.retain(|t| &t.user_id != user_id);
        Ok((before - state.reset_tokens.len()) as u64)
    }

    async fn cleanup_expired(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let mut state = self.state.write().await;
        let before = state.reset_tokens.len();
        state.reset_tokens.retain(|t| !t.is_expired_at(now));
        Ok((before - state.reset_tokens.len()) as u64)
    }
}
