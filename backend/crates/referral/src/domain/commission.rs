//! Commission Rules
//!
//! Pure pricing logic: course price lookup and referrer earnings.

use std::collections::HashMap;

/// Price used for courses missing from the catalog (Naira)
pub const DEFAULT_COURSE_PRICE: i64 = 100_000;

/// Default commission rate in percent
pub const DEFAULT_COMMISSION_PERCENT: u32 = 10;

/// How a referrer's earnings are derived from a course price
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommissionPolicy {
    /// Integer percentage of the price, rounded down
    Percentage(u32),
    /// Fixed amount per referral regardless of price
    Flat(i64),
}

impl Default for CommissionPolicy {
    fn default() -> Self {
        CommissionPolicy::Percentage(DEFAULT_COMMISSION_PERCENT)
    }
}

impl CommissionPolicy {
    pub fn earnings(&self, course_price: i64) -> i64 {
        match *self {
            CommissionPolicy::Percentage(percent) => course_price * i64::from(percent) / 100,
            CommissionPolicy::Flat(amount) => amount,
        }
    }
}

/// Course name to price table
#[derive(Debug, Clone)]
pub struct CourseCatalog {
    prices: HashMap<String, i64>,
    default_price: i64,
}

impl Default for CourseCatalog {
    fn default() -> Self {
        Self::new(
            [
                ("Web Development", 150_000),
                ("Data Science", 180_000),
                ("Mobile Development", 160_000),
                ("UI/UX Design", 120_000),
                ("Digital Marketing", 100_000),
                ("Cybersecurity", 200_000),
                ("Cloud Computing", 170_000),
                ("Machine Learning", 190_000),
            ]
            .into_iter()
            .map(|(name, price)| (name.to_string(), price)),
            DEFAULT_COURSE_PRICE,
        )
    }
}

impl CourseCatalog {
    pub fn new(prices: impl IntoIterator<Item = (String, i64)>, default_price: i64) -> Self {
        Self {
            prices: prices.into_iter().collect(),
            default_price,
        }
    }

    /// Exact-name lookup, falling back to the default price
    pub fn price_for(&self, course: &str) -> i64 {
        self.prices.get(course).copied().unwrap_or(self.default_price)
    }

    pub fn courses(&self) -> impl Iterator<Item = (&str, i64)> {
        self.prices.iter().map(|(name, price)| (name.as_str(), *price))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_rounds_down() {
        let policy = CommissionPolicy::default();
        assert_eq!(policy.earnings(150_000), 15_000);
        assert_eq!(policy.earnings(99), 9);
        assert_eq!(CommissionPolicy::Percentage(15).earnings(200_000), 30_000);
    }

    #[test]
    fn test_flat_ignores_price() {
        let policy = CommissionPolicy::Flat(5_000);
        assert_eq!(policy.earnings(150_000), 5_000);
        assert_eq!(policy.earnings(0), 5_000);
    }

    #[test]
    fn test_catalog_lookup() {
        let catalog = CourseCatalog::default();
        assert_eq!(catalog.price_for("Web Development"), 150_000);
        assert_eq!(catalog.price_for("Cybersecurity"), 200_000);
        assert_eq!(catalog.price_for("Underwater Basket Weaving"), DEFAULT_COURSE_PRICE);
        // Lookup is exact
        assert_eq!(catalog.price_for("web development"), DEFAULT_COURSE_PRICE);
        assert_eq!(catalog.courses().count(), 8);
    }
}
