//! Payout Entity
//!
//! A referrer's withdrawal request. Admins move it from `pending` to
//! `approved` or `rejected` exactly once; approval stamps `paid_at`.

use chrono::{DateTime, Utc};
use kernel::id::PayoutId;
use serde::{Deserialize, Serialize};
use std::fmt;

use auth::domain::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayoutStatus {
    Pending,
    Approved,
    Rejected,
}

impl PayoutStatus {
    pub const fn code(&self) -> &'static str {
        match self {
            PayoutStatus::Pending => "pending",
            PayoutStatus::Approved => "approved",
            PayoutStatus::Rejected => "rejected",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "pending" => Some(PayoutStatus::Pending),
            "approved" => Some(PayoutStatus::Approved),
            "rejected" => Some(PayoutStatus::Rejected),
            _ => None,
        }
    }

    /// Targets an admin may move a pending payout to
    pub fn decision(code: &str) -> Option<Self> {
        match Self::from_code(code) {
            Some(PayoutStatus::Pending) | None => None,
            decided => decided,
        }
    }
}

impl fmt::Display for PayoutStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone)]
pub struct Payout {
    pub id: PayoutId,
    pub user_id: UserId,
    /// Naira
    pub amount: i64,
    pub status: PayoutStatus,
    /// Admin who decided the request
    pub approved_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl Payout {
    pub fn request(user_id: UserId, amount: i64) -> Self {
        Self {
            id: PayoutId::new(),
            user_id,
            amount,
            status: PayoutStatus::Pending,
            approved_by: None,
            created_at: Utc::now(),
            paid_at: None,
        }
    }

    /// Apply an admin decision in place
    pub fn decide(&mut self, decision: PayoutStatus, admin_id: UserId, now: DateTime<Utc>) {
        self.status = decision;
        self.approved_by = Some(admin_id);
        if decision == PayoutStatus::Approved {
            self.paid_at = Some(now);
        }
    }
}

/// Outcome of a payout request checked against the balance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayoutRequestOutcome {
    Created,
    Insufficient { available: i64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decide_approved_stamps_paid_at() {
        let mut payout = Payout::request(UserId::new(), 5_000);
        let admin = UserId::new();
        let now = Utc::now();
        payout.decide(PayoutStatus::Approved, admin, now);

        assert_eq!(payout.status, PayoutStatus::Approved);
        assert_eq!(payout.approved_by, Some(admin));
        assert_eq!(payout.paid_at, Some(now));
    }

    #[test]
    fn test_decide_rejected_leaves_paid_at() {
        let mut payout = Payout::request(UserId::new(), 5_000);
        payout.decide(PayoutStatus::Rejected, UserId::new(), Utc::now());
        assert_eq!(payout.paid_at, None);
    }

    #[test]
    fn test_decision_codes() {
        assert_eq!(PayoutStatus::decision("approved"), Some(PayoutStatus::Approved));
        assert_eq!(PayoutStatus::decision("pending"), None);
        assert_eq!(PayoutStatus::decision(""), None);
    }
}
