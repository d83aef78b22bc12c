//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use kernel::pagination::PageQuery;
use serde::{Deserialize, Serialize};

use crate::domain::entity::{
    payout::{Payout, PayoutStatus},
    referral::{Referral, ReferralRecord, ReferralStatus},
    stats::ReferrerSummary,
};
use crate::infra::paystack::Bank;

// ============================================================================
// Requests
// ============================================================================

/// Missing string fields deserialize as empty so validation can name them
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterStudentRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub course: String,
    pub referral_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackClickRequest {
    #[serde(default)]
    pub referral_code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusRequest {
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockUserRequest {
    pub is_blocked: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PayoutRequest {
    pub amount: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PayoutListQuery {
    #[serde(flatten)]
    pub page: PageQuery,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResolveAccountQuery {
    pub account_number: Option<String>,
    pub bank_code: Option<String>,
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterStudentResponse {
    pub message: String,
    /// `"applied"` when a referrer was credited
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referral: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralResponse {
    pub id: String,
    pub referrer_id: Option<String>,
    pub referred_name: String,
    pub referred_email: String,
    pub referred_phone: String,
    pub course: String,
    pub course_price: i64,
    pub earnings: i64,
    pub status: ReferralStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Referral> for ReferralResponse {
    fn from(referral: Referral) -> Self {
        Self {
            id: referral.id.to_string(),
            referrer_id: referral.referrer_id.map(|id| id.to_string()),
            referred_name: referral.referred_name.as_str().to_string(),
            referred_email: referral.referred_email.into_db(),
            referred_phone: referral.referred_phone.as_str().to_string(),
            course: referral.course,
            course_price: referral.course_price,
            earnings: referral.earnings,
            status: referral.status,
            created_at: referral.created_at,
        }
    }
}

/// Admin view of a referral
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralRecordResponse {
    #[serde(flatten)]
    pub referral: ReferralResponse,
    pub referrer_name: String,
}

impl From<ReferralRecord> for ReferralRecordResponse {
    fn from(record: ReferralRecord) -> Self {
        Self {
            referral: record.referral.into(),
            referrer_name: record.referrer_name,
        }
    }
}

/// Admin student directory row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub course: String,
    pub course_price: i64,
    pub referred_by: String,
    pub status: ReferralStatus,
    pub registered_at: DateTime<Utc>,
}

impl From<ReferralRecord> for StudentResponse {
    fn from(record: ReferralRecord) -> Self {
        let referral = record.referral;
        Self {
            id: referral.id.to_string(),
            name: referral.referred_name.as_str().to_string(),
            email: referral.referred_email.into_db(),
            phone: referral.referred_phone.as_str().to_string(),
            course: referral.course,
            course_price: referral.course_price,
            referred_by: record.referrer_name,
            status: referral.status,
            registered_at: referral.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferrerSummaryResponse {
    pub referrer_id: String,
    pub referrer_name: String,
    pub referral_code: String,
    pub total_usage: i64,
    pub total_earnings: i64,
    /// `Active` once the code has been used
    pub status: String,
    pub is_blocked: bool,
}

impl From<ReferrerSummary> for ReferrerSummaryResponse {
    fn from(summary: ReferrerSummary) -> Self {
        Self {
            status: summary.status().to_string(),
            referrer_id: summary.referrer_id.to_string(),
            referrer_name: summary.referrer_name,
            referral_code: summary.referral_code,
            total_usage: summary.total_usage,
            total_earnings: summary.total_earnings,
            is_blocked: summary.is_blocked,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoutResponse {
    pub id: String,
    pub user_id: String,
    pub amount: i64,
    pub status: PayoutStatus,
    pub approved_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl From<Payout> for PayoutResponse {
    fn from(payout: Payout) -> Self {
        Self {
            id: payout.id.to_string(),
            user_id: payout.user_id.to_string(),
            amount: payout.amount,
            status: payout.status,
            approved_by: payout.approved_by.map(|id| id.to_string()),
            created_at: payout.created_at,
            paid_at: payout.paid_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkPaidResponse {
    pub message: String,
    pub updated: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BankListResponse {
    pub data: Vec<Bank>,
}
