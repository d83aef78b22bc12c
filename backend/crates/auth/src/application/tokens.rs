//! Bearer Tokens
//!
//! HS256 JWTs in two classes, each signed with its own secret:
//! - access: short-lived, accepted by the bearer middleware
//! - refresh: long-lived, accepted only by the refresh use case
//!
//! The `type` claim is checked on top of the secret, so a refresh token can
//! never pass as an access token even if both secrets were configured equal.
//! Expiry is enforced with zero leeway.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::config::TokenConfig;
use crate::domain::entity::user::User;
use crate::domain::value_object::{user_id::UserId, user_role::UserRole};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("invalid token")]
    Invalid,

    #[error("token expired")]
    Expired,

    #[error("failed to sign token: {0}")]
    Signing(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenClass {
    Access,
    Refresh,
}

/// Claims carried by both token classes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: UserId,
    pub email: String,
    pub role: UserRole,
    #[serde(rename = "type")]
    pub class: TokenClass,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// Access and refresh token issued together
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl Keys {
    fn new(secret: &str, ttl: std::time::Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs: ttl.as_secs() as i64,
        }
    }
}

/// Signs and validates bearer tokens; share it behind an `Arc`
pub struct TokenManager {
    access: Keys,
    refresh: Keys,
    issuer: String,
}

impl TokenManager {
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            access: Keys::new(&config.access_secret, config.access_ttl),
            refresh: Keys::new(&config.refresh_secret, config.refresh_ttl),
            issuer: config.issuer.clone(),
        }
    }

    fn keys(&self, class: TokenClass) -> &Keys {
        match class {
            TokenClass::Access => &self.access,
            TokenClass::Refresh => &self.refresh,
        }
    }

    /// Sign a token whose lifetime starts at `issued_at` (unix seconds)
    pub fn sign_at(&self, class: TokenClass, user: &User, issued_at: i64) -> Result<String, TokenError> {
        let keys = self.keys(class);
        let claims = Claims {
            user_id: user.user_id,
            email: user.email.as_str().to_string(),
            role: user.role,
            class,
            iss: self.issuer.clone(),
            iat: issued_at,
            exp: issued_at + keys.ttl_secs,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    pub fn generate_access_token(&self, user: &User) -> Result<String, TokenError> {
        self.sign_at(TokenClass::Access, user, Utc::now().timestamp())
    }

    pub fn generate_refresh_token(&self, user: &User) -> Result<String, TokenError> {
        self.sign_at(TokenClass::Refresh, user, Utc::now().timestamp())
    }

    pub fn issue_pair(&self, user: &User) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.generate_access_token(user)?,
            refresh_token: self.generate_refresh_token(user)?,
        })
    }

    fn validate(&self, class: TokenClass, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss"]);

        let data = jsonwebtoken::decode::<Claims>(token, &self.keys(class).decoding, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })?;

        if data.claims.class != class {
            return Err(TokenError::Invalid);
        }

        Ok(data.claims)
    }

    pub fn validate_access_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate(TokenClass::Access, token)
    }

    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate(TokenClass::Refresh, token)
    }
}
