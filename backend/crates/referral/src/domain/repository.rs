//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use chrono::{DateTime, Utc};
use kernel::id::{PayoutId, ReferralId};
use kernel::pagination::PageRequest;

use auth::domain::{ReferralCode, UserId};

use crate::domain::entity::{
    click::Click,
    payout::{Payout, PayoutRequestOutcome, PayoutStatus},
    referral::{Referral, ReferralRecord, ReferralStatus},
    stats::{PayoutTotals, PlatformStats, ReferrerStats, ReferrerSummary},
};
use crate::error::ReferralResult;

/// Result of a guarded status change (`pending` to a final state)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition<S> {
    Applied,
    /// No row with that id
    Missing,
    /// Row exists but was already decided
    Stale(S),
}

/// Referral repository trait
#[trait_variant::make(ReferralRepository: Send)]
pub trait LocalReferralRepository {
    async fn create(&self, referral: &Referral) -> ReferralResult<()>;

    async fn find_by_id(&self, id: &ReferralId) -> ReferralResult<Option<Referral>>;

    /// Newest first, with the total row count
    async fn list_by_referrer(
        &self,
        referrer_id: &UserId,
        page: PageRequest,
    ) -> ReferralResult<(Vec<Referral>, i64)>;

    /// Every referral with its referrer's name, newest first
    async fn list_all(&self, page: PageRequest) -> ReferralResult<(Vec<ReferralRecord>, i64)>;

    /// Move a pending referral to `status`
    async fn update_status(
        &self,
        id: &ReferralId,
        status: ReferralStatus,
    ) -> ReferralResult<Transition<ReferralStatus>>;

    /// Mark every pending referral of a referrer as paid, returning how many changed
    async fn mark_all_paid_for_referrer(&self, referrer_id: &UserId) -> ReferralResult<u64>;

    async fn referrer_stats(&self, referrer_id: &UserId) -> ReferralResult<ReferrerStats>;

    /// `month_start` bounds the monthly revenue window
    async fn platform_stats(&self, month_start: DateTime<Utc>) -> ReferralResult<PlatformStats>;

    /// Non-admin users ranked by earnings, then usage
    async fn referrer_summaries(
        &self,
        page: PageRequest,
    ) -> ReferralResult<(Vec<ReferrerSummary>, i64)>;
}

/// Payout repository trait
///
/// Method names differ from [`ReferralRepository`]'s so one type can implement both.
#[trait_variant::make(PayoutRepository: Send)]
pub trait LocalPayoutRepository {
    /// Insert `payout` only if it fits in the user's available balance
    ///
    /// Available balance is pending referral earnings minus pending payouts.
    /// Check and insert are atomic with respect to other requests by the
    /// same user.
    async fn request(&self, payout: &Payout) -> ReferralResult<PayoutRequestOutcome>;

    async fn find_payout(&self, id: &PayoutId) -> ReferralResult<Option<Payout>>;

    async fn list_by_user(
        &self,
        user_id: &UserId,
        page: PageRequest,
    ) -> ReferralResult<(Vec<Payout>, i64)>;

    async fn list_payouts(
        &self,
        status: Option<PayoutStatus>,
        page: PageRequest,
    ) -> ReferralResult<(Vec<Payout>, i64)>;

    /// Move a pending payout to `decision`, recording the deciding admin
    async fn decide(
        &self,
        id: &PayoutId,
        decision: PayoutStatus,
        admin_id: &UserId,
        now: DateTime<Utc>,
    ) -> ReferralResult<Transition<PayoutStatus>>;

    /// Sum of the user's pending and approved payouts
    ///
    /// Approved payouts stay committed against pending earnings; marking
    /// referrals paid is a separate settlement channel.
    async fn committed_total_for_user(&self, user_id: &UserId) -> ReferralResult<i64>;

    async fn totals(&self) -> ReferralResult<PayoutTotals>;
}

/// Click repository trait
#[trait_variant::make(ClickRepository: Send)]
pub trait LocalClickRepository {
    async fn record(&self, click: &Click) -> ReferralResult<()>;

    async fn count_for_user(&self, user_id: &UserId) -> ReferralResult<i64>;

    async fn count_for_code(&self, code: &ReferralCode) -> ReferralResult<i64>;
}

/// Everything the referral handlers need from storage
pub trait ReferralStore:
    ReferralRepository + PayoutRepository + ClickRepository + Clone + Send + Sync + 'static
{
}

impl<T> ReferralStore for T where
    T: ReferralRepository + PayoutRepository + ClickRepository + Clone + Send + Sync + 'static
{
}
