//! Aggregates

use serde::{Deserialize, Serialize};

use auth::domain::UserId;

/// One referrer's referral totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReferrerStats {
    pub total_referrals: i64,
    pub paid_earnings: i64,
    pub pending_earnings: i64,
}

/// Referral aggregates over the whole platform
///
/// Referral counts and earnings exclude referrals credited to admins;
/// `total_students` and `total_unique_courses` count every registration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformStats {
    pub total_referrals: i64,
    pub total_earnings: i64,
    pub pending_earnings: i64,
    pub paid_earnings: i64,
    pub paid_count: i64,
    pub total_codes: i64,
    pub active_codes: i64,
    pub total_students: i64,
    pub total_unique_courses: i64,
    /// Course revenue from registrations in the current calendar month
    pub monthly_revenue: i64,
}

/// Payout sums by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutTotals {
    pub approved: i64,
    pub pending: i64,
}

pub const ACTIVE: &str = "Active";
pub const INACTIVE: &str = "Inactive";

/// Row of the admin referrer leaderboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferrerSummary {
    pub referrer_id: UserId,
    pub referrer_name: String,
    pub referral_code: String,
    pub total_usage: i64,
    pub total_earnings: i64,
    pub is_blocked: bool,
}

impl ReferrerSummary {
    pub fn status(&self) -> &'static str {
        if self.total_usage > 0 { ACTIVE } else { INACTIVE }
    }
}
