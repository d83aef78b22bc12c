//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

/// Signing material and lifetimes for bearer tokens
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// HMAC secret for access tokens
    pub access_secret: String,
    /// HMAC secret for refresh tokens; must differ from `access_secret`
    pub refresh_secret: String,
    /// Access token lifetime (15 minutes)
    pub access_ttl: Duration,
    /// Refresh token lifetime (1 week)
    pub refresh_ttl: Duration,
    /// `iss` claim written and required on every token
    pub issuer: String,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            access_secret: String::new(),
            refresh_secret: String::new(),
            access_ttl: Duration::from_secs(15 * 60),
            refresh_ttl: Duration::from_secs(7 * 24 * 3600),
            issuer: "cirvee-referral".to_string(),
        }
    }
}

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub tokens: TokenConfig,
    /// Password reset link lifetime (1 hour)
    pub reset_token_ttl: Duration,
    /// Base URL for links in outgoing mail
    pub frontend_url: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            tokens: TokenConfig::default(),
            reset_token_ttl: Duration::from_secs(3600),
            frontend_url: "http://localhost:5173".to_string(),
        }
    }
}

impl AuthConfig {
    /// Create config with random token secrets (for development and tests)
    pub fn development() -> Self {
        Self {
            tokens: TokenConfig {
                access_secret: platform::crypto::random_hex(32),
                refresh_secret: platform::crypto::random_hex(32),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Reset link TTL as a chrono duration
    pub fn reset_token_ttl(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.reset_token_ttl).unwrap_or_else(|_| chrono::Duration::hours(1))
    }

    /// Link mailed to the user for a raw reset token
    pub fn reset_link(&self, raw_token: &str) -> String {
        format!(
            "{}/reset-password?token={}",
            self.frontend_url.trim_end_matches('/'),
            raw_token
        )
    }
}
