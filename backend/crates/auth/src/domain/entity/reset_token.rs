//! Password Reset Token Entity
//!
//! The raw token only ever exists in the reset link. The database keeps its
//! SHA-256 hex digest.

use chrono::{DateTime, Duration, Utc};
use kernel::id::ResetTokenId;

use crate::domain::value_object::user_id::UserId;

/// Random bytes in a raw reset token (64 hex characters)
pub const RESET_TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone)]
pub struct PasswordResetToken {
    pub id: ResetTokenId,
    pub user_id: UserId,
    pub token_digest: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl PasswordResetToken {
    /// Issue a new token, returning the entity and the raw token to mail out
    pub fn issue(user_id: UserId, ttl: Duration) -> (Self, String) {
        let raw = platform::crypto::random_hex(RESET_TOKEN_BYTES);
        let now = Utc::now();

        let token = Self {
            id: ResetTokenId::new(),
            user_id,
            token_digest: Self::digest(&raw),
            expires_at: now + ttl,
            created_at: now,
        };

        (token, raw)
    }

    /// Digest under which a raw token is stored and looked up
    pub fn digest(raw: &str) -> String {
        platform::crypto::sha256_hex(raw.trim().as_bytes())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_stores_digest_only() {
        let (token, raw) = PasswordResetToken::issue(UserId::new(), Duration::hours(1));
        assert_eq!(raw.len(), RESET_TOKEN_BYTES * 2);
        assert_ne!(token.token_digest, raw);
        assert_eq!(token.token_digest, PasswordResetToken::digest(&raw));
    }

    #[test]
    fn test_expiry() {
        let (token, _) = PasswordResetToken::issue(UserId::new(), Duration::hours(1));
        assert!(!token.is_expired_at(Utc::now()));
        assert!(token.is_expired_at(Utc::now() + Duration::hours(2)));
    }
}
