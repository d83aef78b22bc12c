//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use platform::password::HashedPassword;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{
    reset_token::PasswordResetToken,
    user::{BankDetails, User},
};
use crate::domain::repository::{ResetTokenRepository, UserRepository};
use crate::domain::value_object::{
    email::Email,
    person_name::{PersonName, Phone},
    referral_code::ReferralCode,
    user_id::UserId,
    user_role::UserRole,
};
use crate::error::{AuthError, AuthResult, map_write_error};

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Clean up expired password reset tokens
    pub async fn cleanup_expired(&self) -> AuthResult<u64> {
        let deleted = ResetTokenRepository::cleanup_expired(self, Utc::now()).await?;

        tracing::info!(tokens_deleted = deleted, "Cleaned up expired password reset tokens");

        Ok(deleted)
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id,
                email,
                password_hash,
                name,
                phone,
                role,
                bank_name,
                account_number,
                account_name,
                referral_code,
                is_blocked,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.email.as_str())
        .bind(user.password_hash.as_phc_string())
        .bind(user.name.as_str())
        .bind(user.phone.as_str())
        .bind(user.role.code())
        .bind(user.bank.bank_name.as_deref())
        .bind(user.bank.account_number.as_deref())
        .bind(user.bank.account_name.as_deref())
        .bind(user.referral_code.as_str())
        .bind(user.is_blocked)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                id, email, password_hash, name, phone, role,
                bank_name, account_number, account_name,
                referral_code, is_blocked, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                id, email, password_hash, name, phone, role,
                bank_name, account_number, account_name,
                referral_code, is_blocked, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn find_by_referral_code(&self, code: &ReferralCode) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT
                id, email, password_hash, name, phone, role,
                bank_name, account_number, account_name,
                referral_code, is_blocked, created_at, updated_at
            FROM users
            WHERE referral_code = $1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn exists_by_referral_code(&self, code: &ReferralCode) -> AuthResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE referral_code = $1)")
                .bind(code.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn update_profile(&self, user: &User) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE users SET
                name = $2,
                phone = $3,
                bank_name = $4,
                account_number = $5,
                account_name = $6,
                updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.name.as_str())
        .bind(user.phone.as_str())
        .bind(user.bank.bank_name.as_deref())
        .bind(user.bank.account_number.as_deref())
        .bind(user.bank.account_name.as_deref())
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_password(&self, user: &User) -> AuthResult<()> {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = $3 WHERE id = $1")
            .bind(user.user_id.as_uuid())
            .bind(user.password_hash.as_phc_string())
            .bind(user.updated_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn set_blocked(&self, user_id: &UserId, blocked: bool) -> AuthResult<bool> {
        let updated = sqlx::query("UPDATE users SET is_blocked = $2, updated_at = NOW() WHERE id = $1")
            .bind(user_id.as_uuid())
            .bind(blocked)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(updated > 0)
    }
}

// ============================================================================
// Reset Token Repository Implementation
// ============================================================================

impl ResetTokenRepository for PgAuthRepository {
    async fn replace_for_user(&self, token: &PasswordResetToken) -> AuthResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM password_reset_tokens WHERE user_id = $1")
            .bind(token.user_id.as_uuid())
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO password_reset_tokens (id, user_id, token_hash, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(token.id.as_uuid())
        .bind(token.user_id.as_uuid())
        .bind(&token.token_digest)
        .bind(token.expires_at)
        .bind(token.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_valid(
        &self,
        token_digest: &str,
        now: DateTime<Utc>,
    ) -> AuthResult<Option<PasswordResetToken>> {
        let row = sqlx::query_as::<_, ResetTokenRow>(
            r#"
            SELECT id, user_id, token_hash, expires_at, created_at
            FROM password_reset_tokens
            WHERE token_hash = $1 AND expires_at > $2
            "#,
        )
        .bind(token_digest)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(ResetTokenRow::into_entity))
    }

    async fn delete_by_digest(&self, token_digest: &str) -> AuthResult<()> {
        sqlx::query("DELETE FROM password_reset_tokens WHERE token_hash = $1")
            .bind(token_digest)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_for_user(&self, user_id: &UserId) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM password_reset_tokens WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }

    async fn cleanup_expired(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM password_reset_tokens WHERE expires_at < $1")
            .bind(now)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    name: String,
    phone: String,
    role: String,
    bank_name: Option<String>,
    account_number: Option<String>,
    account_name: Option<String>,
    referral_code: String,
    is_blocked: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        let role = UserRole::from_code(&self.role)
            .ok_or_else(|| AuthError::Internal(format!("unknown role `{}`", self.role)))?;
        let password_hash = HashedPassword::from_phc_string(self.password_hash)?;

        Ok(User {
            user_id: UserId::from_uuid(self.id),
            email: Email::from_db(self.email),
            password_hash,
            name: PersonName::from_db(self.name),
            phone: Phone::from_db(self.phone),
            role,
            bank: BankDetails {
                bank_name: self.bank_name,
                account_number: self.account_number,
                account_name: self.account_name,
            },
            referral_code: ReferralCode::from_db(self.referral_code),
            is_blocked: self.is_blocked,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ResetTokenRow {
    id: Uuid,
    user_id: Uuid,
    token_hash: String,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl ResetTokenRow {
    fn into_entity(self) -> PasswordResetToken {
        PasswordResetToken {
            id: self.id.into(),
            user_id: UserId::from_uuid(self.user_id),
            token_digest: self.token_hash,
            expires_at: self.expires_at,
            created_at: self.created_at,
        }
    }
}
