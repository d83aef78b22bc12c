//! Referral Link Click

use chrono::{DateTime, Utc};
use uuid::Uuid;

use auth::domain::{ReferralCode, UserId};

#[derive(Debug, Clone)]
pub struct Click {
    pub id: Uuid,
    /// Code as submitted (normalized), even when it matches nobody
    pub referral_code: ReferralCode,
    /// Owner of the code when it resolved
    pub user_id: Option<UserId>,
    pub ip_address: String,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Click {
    pub fn new(
        referral_code: ReferralCode,
        user_id: Option<UserId>,
        ip_address: String,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            referral_code,
            user_id,
            ip_address,
            user_agent,
            created_at: Utc::now(),
        }
    }
}
