//! Environment Configuration
//!
//! Every setting comes from the process environment (after `.env` is
//! loaded). Crate configs start from their defaults and only the variables
//! that are set override them.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, bail};
use auth::{AuthConfig, TokenConfig};
use platform::mail::MailConfig;
use platform::rate_limit::RateLimitConfig;
use referral::{CommissionPolicy, CourseCatalog, PaystackConfig, ReferralConfig};
use referral::domain::commission::DEFAULT_COURSE_PRICE;

/// Administrator account ensured at startup
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub email: String,
    /// Empty skips seeding
    pub password: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub app_env: String,
    pub database_url: String,
    pub db_max_conns: u32,
    /// Empty selects the in-process store
    pub redis_url: String,
    pub cors_origins: Vec<String>,
    pub admin: AdminSeed,
    pub rate_limit: RateLimitConfig,
    pub auth_rate_limit: RateLimitConfig,
    pub auth: AuthConfig,
    pub referral: ReferralConfig,
    pub mail: MailConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());
        let required = |key: &str| var(key).with_context(|| format!("{} must be set", key));

        let access_secret = required("JWT_SECRET")?;
        let refresh_secret = required("JWT_REFRESH_SECRET")?;
        if access_secret == refresh_secret {
            bail!("JWT_REFRESH_SECRET must differ from JWT_SECRET");
        }

        let frontend_url = or("FRONTEND_URL", "http://localhost:5173");
        let admin_email = or("ADMIN_EMAIL", "admin@cirvee.com");

        let auth = AuthConfig {
            tokens: TokenConfig {
                access_secret,
                refresh_secret,
                access_ttl: duration(&or("JWT_ACCESS_EXPIRY", "15m"), "JWT_ACCESS_EXPIRY")?,
                refresh_ttl: duration(&or("JWT_REFRESH_EXPIRY", "168h"), "JWT_REFRESH_EXPIRY")?,
                ..TokenConfig::default()
            },
            frontend_url: frontend_url.clone(),
            ..AuthConfig::default()
        };

        let default_price = number(&or("DEFAULT_COURSE_PRICE", &DEFAULT_COURSE_PRICE.to_string()), "DEFAULT_COURSE_PRICE")?;
        let catalog = match var("COURSE_PRICES") {
            Some(raw) => CourseCatalog::new(course_prices(&raw)?, default_price),
            None => {
                let defaults: Vec<(String, i64)> = CourseCatalog::default()
                    .courses()
                    .map(|(name, price)| (name.to_string(), price))
                    .collect();
                CourseCatalog::new(defaults, default_price)
            }
        };

        let referral = ReferralConfig {
            commission: commission(var("COMMISSION_MODE").as_deref(), var("COMMISSION_VALUE").as_deref())?,
            catalog,
            admin_email: admin_email.clone(),
            frontend_url,
            dashboard_cache_ttl: duration(&or("DASHBOARD_CACHE_TTL", "5m"), "DASHBOARD_CACHE_TTL")?,
            paystack: PaystackConfig {
                secret_key: or("PAYSTACK_SECRET_KEY", ""),
                base_url: or("PAYSTACK_BASE_URL", "https://api.paystack.co"),
                ..PaystackConfig::default()
            },
        };

        let mail = MailConfig {
            host: or("SMTP_HOST", "smtp.gmail.com"),
            port: number(&or("SMTP_PORT", "587"), "SMTP_PORT")?,
            username: or("SMTP_USER", ""),
            password: or("SMTP_PASSWORD", ""),
            from_name: or("SMTP_FROM_NAME", "Cirvee"),
            from_email: or("SMTP_FROM_EMAIL", "noreply@cirvee.com"),
        };

        Ok(Self {
            port: number(&or("PORT", "8080"), "PORT")?,
            app_env: or("APP_ENV", "development"),
            database_url: required("DATABASE_URL")?,
            db_max_conns: number(&or("DB_MAX_CONNS", "25"), "DB_MAX_CONNS")?,
            redis_url: lookup("REDIS_URL")
                .map(|v| v.trim().to_string())
                .unwrap_or_else(|| "redis://localhost:6379".to_string()),
            cors_origins: or("CORS_ORIGIN", "http://localhost:5173")
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect(),
            admin: AdminSeed {
                email: admin_email,
                password: or("ADMIN_PASSWORD", ""),
                name: or("ADMIN_NAME", "Super Admin"),
            },
            rate_limit: RateLimitConfig {
                max_requests: number(&or("RATE_LIMIT_REQUESTS", "100"), "RATE_LIMIT_REQUESTS")?,
                window: duration(&or("RATE_LIMIT_WINDOW", "1m"), "RATE_LIMIT_WINDOW")?,
            },
            auth_rate_limit: RateLimitConfig {
                max_requests: number(&or("AUTH_RATE_LIMIT_REQUESTS", "5"), "AUTH_RATE_LIMIT_REQUESTS")?,
                window: duration(&or("AUTH_RATE_LIMIT_WINDOW", "1m"), "AUTH_RATE_LIMIT_WINDOW")?,
            },
            auth,
            referral,
            mail,
        })
    }

    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }
}

fn number<T>(raw: &str, key: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse()
        .with_context(|| format!("{} must be a number, got `{}`", key, raw))
}

/// `<n>s`, `<n>m` or `<n>h`; a bare number is seconds
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let (digits, unit) = match raw.char_indices().last()? {
        (i, c) if c.is_ascii_alphabetic() => (&raw[..i], c),
        _ => (raw, 's'),
    };

    let n: u64 = digits.trim().parse().ok()?;
    let secs = match unit {
        's' => n,
        'm' => n.checked_mul(60)?,
        'h' => n.checked_mul(3600)?,
        _ => return None,
    };

    Some(Duration::from_secs(secs))
}

fn duration(raw: &str, key: &str) -> anyhow::Result<Duration> {
    match parse_duration(raw) {
        Some(d) if !d.is_zero() => Ok(d),
        _ => bail!("{} must be a duration like 30s, 15m or 2h, got `{}`", key, raw),
    }
}

fn commission(mode: Option<&str>, value: Option<&str>) -> anyhow::Result<CommissionPolicy> {
    let mode = mode.unwrap_or("percentage").to_ascii_lowercase();

    match mode.as_str() {
        "percentage" => {
            let percent: u32 = number(value.unwrap_or("10"), "COMMISSION_VALUE")?;
            if percent > 100 {
                bail!("COMMISSION_VALUE must be at most 100 in percentage mode");
            }
            Ok(CommissionPolicy::Percentage(percent))
        }
        "flat" => {
            let amount: i64 = number(value.unwrap_or("0"), "COMMISSION_VALUE")?;
            if amount < 0 {
                bail!("COMMISSION_VALUE must not be negative");
            }
            Ok(CommissionPolicy::Flat(amount))
        }
        other => bail!("COMMISSION_MODE must be `percentage` or `flat`, got `{}`", other),
    }
}

/// `Name=price;Name=price`
fn course_prices(raw: &str) -> anyhow::Result<HashMap<String, i64>> {
    raw.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (name, price) = entry
                .split_once('=')
                .with_context(|| format!("COURSE_PRICES entry `{}` must look like Name=price", entry))?;
            let price: i64 = number(price.trim(), "COURSE_PRICES")?;
            Ok((name.trim().to_string(), price))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const BASE: &[(&str, &str)] = &[
        ("DATABASE_URL", "postgres://localhost/cirvee"),
        ("JWT_SECRET", "access-secret"),
        ("JWT_REFRESH_SECRET", "refresh-secret"),
    ];

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("15m"), Some(Duration::from_secs(900)));
        assert_eq!(parse_duration("168h"), Some(Duration::from_secs(168 * 3600)));
        assert_eq!(parse_duration("30s"), Some(Duration::from_secs(30)));
        assert_eq!(parse_duration("45"), Some(Duration::from_secs(45)));
        assert_eq!(parse_duration("2d"), None);
        assert_eq!(parse_duration("m"), None);
        assert_eq!(parse_duration(""), None);
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(env(BASE)).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.db_max_conns, 25);
        assert_eq!(config.redis_url, "redis://localhost:6379");
        assert_eq!(config.cors_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.auth.tokens.access_ttl, Duration::from_secs(900));
        assert_eq!(config.auth.tokens.refresh_ttl, Duration::from_secs(168 * 3600));
        assert_eq!(config.rate_limit.max_requests, 100);
        assert_eq!(config.auth_rate_limit.max_requests, 5);
        assert_eq!(config.referral.commission, CommissionPolicy::Percentage(10));
        assert_eq!(config.referral.price_and_earnings("Web Development"), (150_000, 15_000));
        assert!(config.admin.password.is_empty());
        assert!(!config.mail.is_configured());
        assert!(!config.is_production());
    }

    #[test]
    fn test_required_and_distinct_secrets() {
        assert!(AppConfig::from_lookup(env(&BASE[1..])).is_err());

        let same = [
            ("DATABASE_URL", "postgres://localhost/cirvee"),
            ("JWT_SECRET", "same"),
            ("JWT_REFRESH_SECRET", "same"),
        ];
        let err = AppConfig::from_lookup(env(&same)).unwrap_err();
        assert!(err.to_string().contains("must differ"));
    }

    #[test]
    fn test_overrides() {
        let mut pairs = BASE.to_vec();
        pairs.extend([
            ("REDIS_URL", ""),
            ("CORS_ORIGIN", "https://cirvee.com, https://admin.cirvee.com"),
            ("COMMISSION_MODE", "flat"),
            ("COMMISSION_VALUE", "5000"),
            ("COURSE_PRICES", "Rust Systems=250000; Go Basics=90000"),
            ("DEFAULT_COURSE_PRICE", "50000"),
            ("AUTH_RATE_LIMIT_WINDOW", "2m"),
        ]);
        let config = AppConfig::from_lookup(env(&pairs)).unwrap();

        assert!(config.redis_url.is_empty());
        assert_eq!(config.cors_origins.len(), 2);
        assert_eq!(config.referral.price_and_earnings("Rust Systems"), (250_000, 5_000));
        assert_eq!(config.referral.price_and_earnings("Web Development"), (50_000, 5_000));
        assert_eq!(config.auth_rate_limit.window, Duration::from_secs(120));
    }

    #[test]
    fn test_rejects_bad_values() {
        for (key, value) in [
            ("COMMISSION_MODE", "tiered"),
            ("COMMISSION_VALUE", "150"),
            ("COURSE_PRICES", "Broken"),
            ("JWT_ACCESS_EXPIRY", "soon"),
            ("PORT", "eighty"),
        ] {
            let mut pairs = BASE.to_vec();
            pairs.push((key, value));
            assert!(AppConfig::from_lookup(env(&pairs)).is_err(), "{} accepted", key);
        }
    }
}
