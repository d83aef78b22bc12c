//! In-memory Repository Implementation
//!
//! Vec-backed store behind a `tokio::sync::RwLock`, for tests and local runs
//! without PostgreSQL. User joins (names, roles, codes) read from the shared
//! [`MemoryAuthRepository`]. Rows are kept in insertion order, so iterating
//! in reverse lists newest first.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use kernel::id::{PayoutId, ReferralId};
use kernel::pagination::PageRequest;
use tokio::sync::RwLock;

use auth::MemoryAuthRepository;
use auth::domain::{ReferralCode, User, UserId};

use crate::domain::entity::{
    click::Click,
    payout::{Payout, PayoutRequestOutcome, PayoutStatus},
    referral::{DIRECT_REFERRER_NAME, Referral, ReferralRecord, ReferralStatus},
    stats::{PayoutTotals, PlatformStats, ReferrerStats, ReferrerSummary},
};
use crate::domain::repository::{
    ClickRepository, PayoutRepository, ReferralRepository, Transition,
};
use crate::error::ReferralResult;

#[derive(Default)]
struct State {
    referrals: Vec<Referral>,
    payouts: Vec<Payout>,
    clicks: Vec<Click>,
}

#[derive(Clone)]
pub struct MemoryReferralRepository {
    users: MemoryAuthRepository,
    state: Arc<RwLock<State>>,
}

impl MemoryReferralRepository {
    /// `users` must be the same store the auth handlers write to
    pub fn new(users: MemoryAuthRepository) -> Self {
        Self {
            users,
            state: Arc::new(RwLock::new(State::default())),
        }
    }

    pub async fn click_count(&self) -> usize {
        self.state.read().await.clicks.len()
    }

    async fn users_by_id(&self) -> HashMap<UserId, User> {
        self.users
            .all_users()
            .await
            .into_iter()
            .map(|user| (user.user_id, user))
            .collect()
    }
}

fn page_of<T>(items: impl Iterator<Item = T>, page: PageRequest) -> Vec<T> {
    items
        .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
        .take(usize::try_from(page.limit()).unwrap_or(0))
        .collect()
}

fn sum_earnings<'a>(referrals: impl Iterator<Item = &'a Referral>, status: ReferralStatus) -> i64 {
    referrals
        .filter(|r| r.status == status)
        .map(|r| r.earnings)
        .sum()
}

fn committed_payouts(payouts: &[Payout], user_id: &UserId) -> i64 {
    payouts
        .iter()
        .filter(|p| &p.user_id == user_id && p.status != PayoutStatus::Rejected)
        .map(|p| p.amount)
        .sum()
}

// ============================================================================
// Referral Repository Implementation
// ============================================================================

impl ReferralRepository for MemoryReferralRepository {
    async fn create(&self, referral: &Referral) -> ReferralResult<()> {
        self.state.write().await.referrals.push(referral.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ReferralId) -> ReferralResult<Option<Referral>> {
        Ok(self
            .state
            .read()
            .await
            .referrals
            .iter()
            .find(|r| &r.id == id)
            .cloned())
    }

    async fn list_by_referrer(
        &self,
        referrer_id: &UserId,
        page: PageRequest,
    ) -> ReferralResult<(Vec<Referral>, i64)> {
        let state = self.state.read().await;
        let owned = || {
            state
                .referrals
                .iter()
                .rev()
                .filter(|r| r.referrer_id.as_ref() == Some(referrer_id))
        };

        let total = owned().count() as i64;
        Ok((page_of(owned().cloned(), page), total))
    }

    async fn list_all(&self, page: PageRequest) -> ReferralResult<(Vec<ReferralRecord>, i64)> {
        let users = self.users_by_id().await;
        let state = self.state.read().await;

        let records = state.referrals.iter().rev().map(|referral| ReferralRecord {
            referrer_name: referral
                .referrer_id
                .and_then(|id| users.get(&id))
                .map(|user| user.name.as_str().to_string())
                .unwrap_or_else(|| DIRECT_REFERRER_NAME.to_string()),
            referral: referral.clone(),
        });

        Ok((page_of(records, page), state.referrals.len() as i64))
    }

    async fn update_status(
        &self,
        id: &ReferralId,
        status: ReferralStatus,
    ) -> ReferralResult<Transition<ReferralStatus>> {
        let mut state = self.state.write().await;

        Ok(match state.referrals.iter_mut().find(|r| &r.id == id) {
            None => Transition::Missing,
            Some(referral) if referral.status != ReferralStatus::Pending => {
                Transition::Stale(referral.status)
            }
            Some(referral) => {
                referral.status = status;
                Transition::Applied
            }
        })
    }

    async fn mark_all_paid_for_referrer(&self, referrer_id: &UserId) -> ReferralResult<u64> {
        let mut state = self.state.write().await;
        let mut updated = 0;

        for referral in state.referrals.iter_mut().filter(|r| {
            r.referrer_id.as_ref() == Some(referrer_id) && r.status == ReferralStatus::Pending
        }) {
            referral.status = ReferralStatus::Paid;
            updated += 1;
        }

        Ok(updated)
    }

    async fn referrer_stats(&self, referrer_id: &UserId) -> ReferralResult<ReferrerStats> {
        let state = self.state.read().await;
        let owned = || {
            state
                .referrals
                .iter()
                .filter(|r| r.referrer_id.as_ref() == Some(referrer_id))
        };

        Ok(ReferrerStats {
            total_referrals: owned().count() as i64,
            paid_earnings: sum_earnings(owned(), ReferralStatus::Paid),
            pending_earnings: sum_earnings(owned(), ReferralStatus::Pending),
        })
    }

    async fn platform_stats(&self, month_start: DateTime<Utc>) -> ReferralResult<PlatformStats> {
        let users = self.users_by_id().await;
        let state = self.state.read().await;

        let is_admin = |id: &UserId| users.get(id).is_some_and(|user| user.role.is_admin());
        let credited = || {
            state
                .referrals
                .iter()
                .filter(|r| !r.referrer_id.as_ref().is_some_and(|id| is_admin(id)))
        };

        let active: HashSet<UserId> = credited().filter_map(|r| r.referrer_id).collect();
        let courses: HashSet<&str> = state.referrals.iter().map(|r| r.course.as_str()).collect();

        Ok(PlatformStats {
            total_referrals: credited().filter(|r| r.referrer_id.is_some()).count() as i64,
            total_earnings: credited()
                .filter(|r| r.status != ReferralStatus::Rejected)
                .map(|r| r.earnings)
                .sum(),
            pending_earnings: sum_earnings(credited(), ReferralStatus::Pending),
            paid_earnings: sum_earnings(credited(), ReferralStatus::Paid),
            paid_count: credited()
                .filter(|r| r.status == ReferralStatus::Paid)
                .count() as i64,
            total_codes: users.values().filter(|user| !user.role.is_admin()).count() as i64,
            active_codes: active.len() as i64,
            total_students: state.referrals.len() as i64,
            total_unique_courses: courses.len() as i64,
            monthly_revenue: state
                .referrals
                .iter()
                .filter(|r| r.created_at >= month_start)
                .map(|r| r.course_price)
                .sum(),
        })
    }

    async fn referrer_summaries(
        &self,
        page: PageRequest,
    ) -> ReferralResult<(Vec<ReferrerSummary>, i64)> {
        let users = self.users.all_users().await;
        let state = self.state.read().await;

        let mut referrers: Vec<(&User, ReferrerSummary)> = users
            .iter()
            .filter(|user| !user.role.is_admin())
            .map(|user| {
                let owned = state
                    .referrals
                    .iter()
                    .filter(|r| r.referrer_id == Some(user.user_id));

                let (total_usage, total_earnings) = owned.fold((0i64, 0i64), |(n, sum), r| {
                    let earned = if r.status == ReferralStatus::Rejected { 0 } else { r.earnings };
                    (n + 1, sum + earned)
                });

                (
                    user,
                    ReferrerSummary {
                        referrer_id: user.user_id,
                        referrer_name: user.name.as_str().to_string(),
                        referral_code: user.referral_code.as_str().to_string(),
                        total_usage,
                        total_earnings,
                        is_blocked: user.is_blocked,
                    },
                )
            })
            .collect();

        referrers.sort_by(|(a_user, a), (b_user, b)| {
            b.total_earnings
                .cmp(&a.total_earnings)
                .then(b.total_usage.cmp(&a.total_usage))
                .then(a_user.created_at.cmp(&b_user.created_at))
        });

        let total = referrers.len() as i64;
        let summaries = page_of(referrers.into_iter().map(|(_, summary)| summary), page);
        Ok((summaries, total))
    }
}

// ============================================================================
// Payout Repository Implementation
// ============================================================================

impl PayoutRepository for MemoryReferralRepository {
    async fn request(&self, payout: &Payout) -> ReferralResult<PayoutRequestOutcome> {
        // Balance check and insert share one write lock
        let mut state = self.state.write().await;

        let pending_earnings = sum_earnings(
            state
                .referrals
                .iter()
                .filter(|r| r.referrer_id == Some(payout.user_id)),
            ReferralStatus::Pending,
        );
        let available = pending_earnings - committed_payouts(&state.payouts, &payout.user_id);

        if payout.amount > available {
            return Ok(PayoutRequestOutcome::Insufficient {
                available: available.max(0),
            });
        }

        state.payouts.push(payout.clone());
        Ok(PayoutRequestOutcome::Created)
    }

    async fn find_payout(&self, id: &PayoutId) -> ReferralResult<Option<Payout>> {
        Ok(self
            .state
            .read()
            .await
            .payouts
            .iter()
            .find(|p| &p.id == id)
            .cloned())
    }

    async fn list_by_user(
        &self,
        user_id: &UserId,
        page: PageRequest,
    ) -> ReferralResult<(Vec<Payout>, i64)> {
        let state = self.state.read().await;
        let owned = || state.payouts.iter().rev().filter(|p| &p.user_id == user_id);

        let total = owned().count() as i64;
        Ok((page_of(owned().cloned(), page), total))
    }

    async fn list_payouts(
        &self,
        status: Option<PayoutStatus>,
        page: PageRequest,
    ) -> ReferralResult<(Vec<Payout>, i64)> {
        let state = self.state.read().await;
        let matching = || {
            state
                .payouts
                .iter()
                .rev()
                .filter(|p| status.is_none_or(|s| p.status == s))
        };

        let total = matching().count() as i64;
        Ok((page_of(matching().cloned(), page), total))
    }

    async fn decide(
        &self,
        id: &PayoutId,
        decision: PayoutStatus,
        admin_id: &UserId,
        now: DateTime<Utc>,
    ) -> ReferralResult<Transition<PayoutStatus>> {
        let mut state = self.state.write().await;

        Ok(match state.payouts.iter_mut().find(|p| &p.id == id) {
            None => Transition::Missing,
            Some(payout) if payout.status != PayoutStatus::Pending => Transition::Stale(payout.status),
            Some(payout) => {
                payout.decide(decision, *admin_id, now);
                Transition::Applied
            }
        })
    }

    async fn committed_total_for_user(&self, user_id: &UserId) -> ReferralResult<i64> {
        Ok(committed_payouts(&self.state.read().await.payouts, user_id))
    }

    async fn totals(&self) -> ReferralResult<PayoutTotals> {
        let state = self.state.read().await;
        let sum = |status: PayoutStatus| -> i64 {
            state
                .payouts
                .iter()
                .filter(|p| p.status == status)
                .map(|p| p.amount)
                .sum()
        };

        Ok(PayoutTotals {
            approved: sum(PayoutStatus::Approved),
            pending: sum(PayoutStatus::Pending),
        })
    }
}

// ============================================================================
// Click Repository Implementation
// ============================================================================

impl ClickRepository for MemoryReferralRepository {
    async fn record(&self, click: &Click) -> ReferralResult<()> {
        self.state.write().await.clicks.push(click.clone());
        Ok(())
    }

    async fn count_for_user(&self, user_id: &UserId) -> ReferralResult<i64> {
        let code = self
            .users
            .all_users()
            .await
            .into_iter()
            .find(|user| &user.user_id == user_id)
            .map(|user| user.referral_code);

        let Some(code) = code else {
            return Ok(0);
        };

        self.count_for_code(&code).await
    }

    async fn count_for_code(&self, code: &ReferralCode) -> ReferralResult<i64> {
        Ok(self
            .state
            .read()
            .await
            .clicks
            .iter()
            .filter(|c| &c.referral_code == code)
            .count() as i64)
    }
}
