//! Application Configuration
//!
//! Configuration for the referral application layer.

use std::time::Duration;

use crate::domain::commission::{CommissionPolicy, CourseCatalog};

/// Paystack API settings
#[derive(Debug, Clone)]
pub struct PaystackConfig {
    /// Secret key sent as a bearer token; empty disables the bank endpoints' auth
    pub secret_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for PaystackConfig {
    fn default() -> Self {
        Self {
            secret_key: String::new(),
            base_url: "https://api.paystack.co".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Referral application configuration
#[derive(Debug, Clone)]
pub struct ReferralConfig {
    pub commission: CommissionPolicy,
    pub catalog: CourseCatalog,
    /// Recipient of new-student alerts
    pub admin_email: String,
    /// Base URL for links in outgoing mail
    pub frontend_url: String,
    /// Lifetime of the cached admin dashboard
    pub dashboard_cache_ttl: Duration,
    pub paystack: PaystackConfig,
}

impl Default for ReferralConfig {
    fn default() -> Self {
        Self {
            commission: CommissionPolicy::default(),
            catalog: CourseCatalog::default(),
            admin_email: "admin@cirvee.com".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            dashboard_cache_ttl: Duration::from_secs(300),
            paystack: PaystackConfig::default(),
        }
    }
}

impl ReferralConfig {
    /// Earnings a referrer receives for `course`, with the price it was based on
    pub fn price_and_earnings(&self, course: &str) -> (i64, i64) {
        let price = self.catalog.price_for(course);
        (price, self.commission.earnings(price))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReferralConfig::default();
        assert_eq!(config.dashboard_cache_ttl, Duration::from_secs(300));
        assert_eq!(config.paystack.base_url, "https://api.paystack.co");
        assert_eq!(config.price_and_earnings("Web Development"), (150_000, 15_000));
        assert_eq!(config.price_and_earnings("Pottery"), (100_000, 10_000));
    }

    #[test]
    fn test_flat_commission() {
        let config = ReferralConfig {
            commission: CommissionPolicy::Flat(2_500),
            ..Default::default()
        };
        assert_eq!(config.price_and_earnings("Data Science"), (180_000, 2_500));
    }
}
