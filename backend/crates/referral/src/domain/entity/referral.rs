//! Referral Entity
//!
//! One record per student registration. `referrer_id` is `None` for direct
//! sign-ups, which always earn nothing.

use chrono::{DateTime, Utc};
use kernel::id::ReferralId;
use serde::{Deserialize, Serialize};
use std::fmt;

use auth::domain::{Email, PersonName, Phone, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferralStatus {
    Pending,
    Paid,
    Rejected,
}

impl ReferralStatus {
    pub const fn code(&self) -> &'static str {
        match self {
            ReferralStatus::Pending => "pending",
            ReferralStatus::Paid => "paid",
            ReferralStatus::Rejected => "rejected",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "pending" => Some(ReferralStatus::Pending),
            "paid" => Some(ReferralStatus::Paid),
            "rejected" => Some(ReferralStatus::Rejected),
            _ => None,
        }
    }

    /// Targets an admin may move a pending referral to
    pub fn decision(code: &str) -> Option<Self> {
        match Self::from_code(code.trim()) {
            Some(ReferralStatus::Pending) | None => None,
            decided => decided,
        }
    }
}

impl fmt::Display for ReferralStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone)]
pub struct Referral {
    pub id: ReferralId,
    pub referrer_id: Option<UserId>,
    pub referred_name: PersonName,
    pub referred_email: Email,
    pub referred_phone: Phone,
    pub course: String,
    /// Naira
    pub course_price: i64,
    /// Naira; zero for direct sign-ups
    pub earnings: i64,
    pub status: ReferralStatus,
    pub created_at: DateTime<Utc>,
}

/// A validated student registration
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub name: PersonName,
    pub email: Email,
    pub phone: Phone,
    pub course: String,
}

impl Referral {
    pub fn new(student: NewStudent, referrer_id: Option<UserId>, course_price: i64, earnings: i64) -> Self {
        Self {
            id: ReferralId::new(),
            referrer_id,
            referred_name: student.name,
            referred_email: student.email,
            referred_phone: student.phone,
            course: student.course,
            course_price,
            earnings: if referrer_id.is_some() { earnings } else { 0 },
            status: ReferralStatus::Pending,
            created_at: Utc::now(),
        }
    }

    pub fn is_direct(&self) -> bool {
        self.referrer_id.is_none()
    }
}

/// Referral joined with its referrer's display name (`-` for direct sign-ups)
#[derive(Debug, Clone)]
pub struct ReferralRecord {
    pub referral: Referral,
    pub referrer_name: String,
}

pub const DIRECT_REFERRER_NAME: &str = "-";
