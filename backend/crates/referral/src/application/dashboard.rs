//! Dashboards
//!
//! The admin dashboard is cached in the key-value store under
//! [`ADMIN_STATS_KEY`] and dropped whenever a referral or payout changes.
//! Cache failures are logged and fall through to the database.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Datelike, Utc};
use kernel::pagination::{PageRequest, Paginated};
use platform::kv::KvStore;
use serde::{Deserialize, Serialize};

use auth::domain::{UserId, UserRepository};

use crate::domain::entity::referral::Referral;
use crate::domain::entity::stats::{PayoutTotals, PlatformStats};
use crate::domain::repository::{ClickRepository, PayoutRepository, ReferralRepository};
use crate::error::{ReferralError, ReferralResult};

pub const ADMIN_STATS_KEY: &str = "dashboard:admin_stats";

/// Platform totals shown to admins
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminDashboard {
    pub total_referrals: i64,
    pub total_earnings: i64,
    pub pending_balance: i64,
    pub total_paid_earnings: i64,
    pub paid_count: i64,
    /// Sum of approved payouts
    pub total_payouts: i64,
    pub pending_payouts: i64,
    pub active_codes: i64,
    pub total_codes: i64,
    pub total_students: i64,
    pub total_unique_courses: i64,
    pub monthly_revenue: i64,
}

impl AdminDashboard {
    pub fn new(stats: PlatformStats, payouts: PayoutTotals) -> Self {
        Self {
            total_referrals: stats.total_referrals,
            total_earnings: stats.total_earnings,
            pending_balance: stats.pending_earnings,
            total_paid_earnings: stats.paid_earnings,
            paid_count: stats.paid_count,
            total_payouts: payouts.approved,
            pending_payouts: payouts.pending,
            active_codes: stats.active_codes,
            total_codes: stats.total_codes,
            total_students: stats.total_students,
            total_unique_courses: stats.total_unique_courses,
            monthly_revenue: stats.monthly_revenue,
        }
    }
}

/// One referrer's totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserDashboard {
    pub total_referrals: i64,
    /// Paid plus pending earnings; rejected referrals earn nothing
    pub total_earnings: i64,
    /// Pending referral earnings
    pub pending_balance: i64,
    /// Pending earnings not yet claimed by a pending or approved payout
    pub available_balance: i64,
    pub total_paid_earnings: i64,
    pub total_clicks: i64,
    pub referral_code: String,
}

/// Midnight UTC on the first day of `now`'s month
pub fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .with_day(1)
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|start| start.and_utc())
        .unwrap_or(now)
}

// ============================================================================
// Cache
// ============================================================================

/// Admin dashboard cache over a [`KvStore`]
#[derive(Clone)]
pub struct StatsCache<K> {
    store: K,
    ttl: Duration,
}

impl<K> StatsCache<K>
where
    K: KvStore + Clone + Send + Sync + 'static,
{
    pub fn new(store: K, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub async fn get(&self) -> Option<AdminDashboard> {
        let raw = match self.store.get(ADMIN_STATS_KEY).await {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(error = %e, "Dashboard cache read failed");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(dashboard) => Some(dashboard),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable dashboard cache entry");
                None
            }
        }
    }

    pub async fn put(&self, dashboard: &AdminDashboard) {
        let raw = match serde_json::to_string(dashboard) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to encode dashboard");
                return;
            }
        };

        if let Err(e) = self.store.set_ex(ADMIN_STATS_KEY, &raw, self.ttl).await {
            tracing::warn!(error = %e, "Dashboard cache write failed");
        }
    }

    pub async fn invalidate(&self) {
        if let Err(e) = self.store.del(ADMIN_STATS_KEY).await {
            tracing::warn!(error = %e, "Dashboard cache invalidation failed");
        }
    }
}

// ============================================================================
// Use cases
// ============================================================================

pub struct AdminDashboardUseCase<R, K> {
    repo: Arc<R>,
    cache: StatsCache<K>,
}

impl<R, K> AdminDashboardUseCase<R, K>
where
    R: ReferralRepository + PayoutRepository,
    K: KvStore + Clone + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, cache: StatsCache<K>) -> Self {
        Self { repo, cache }
    }

    pub async fn execute(&self) -> ReferralResult<AdminDashboard> {
        if let Some(cached) = self.cache.get().await {
            tracing::debug!("Admin dashboard served from cache");
            return Ok(cached);
        }

        let stats = self.repo.platform_stats(month_start(Utc::now())).await?;
        let payouts = self.repo.totals().await?;
        let dashboard = AdminDashboard::new(stats, payouts);

        self.cache.put(&dashboard).await;

        Ok(dashboard)
    }
}

pub struct UserDashboardUseCase<R, U> {
    repo: Arc<R>,
    users: Arc<U>,
}

impl<R, U> UserDashboardUseCase<R, U>
where
    R: ReferralRepository + PayoutRepository + ClickRepository,
    U: UserRepository,
{
    pub fn new(repo: Arc<R>, users: Arc<U>) -> Self {
        Self { repo, users }
    }

    pub async fn execute(&self, user_id: &UserId) -> ReferralResult<UserDashboard> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(ReferralError::UserNotFound)?;

        let stats = self.repo.referrer_stats(user_id).await?;
        let committed_payouts = self.repo.committed_total_for_user(user_id).await?;
        let total_clicks = self.repo.count_for_user(user_id).await?;

        Ok(UserDashboard {
            total_referrals: stats.total_referrals,
            total_earnings: stats.paid_earnings + stats.pending_earnings,
            pending_balance: stats.pending_earnings,
            available_balance: (stats.pending_earnings - committed_payouts).max(0),
            total_paid_earnings: stats.paid_earnings,
            total_clicks,
            referral_code: user.referral_code.as_str().to_string(),
        })
    }

    /// The referrer's own referrals, newest first
    pub async fn referrals(&self, user_id: &UserId, page: PageRequest) -> ReferralResult<Paginated<Referral>> {
        let (referrals, total) = self.repo.list_by_referrer(user_id, page).await?;
        Ok(Paginated::new(referrals, page, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use platform::kv::MemoryStore;

    #[test]
    fn test_month_start() {
        let now = Utc.with_ymd_and_hms(2026, 3, 17, 14, 5, 9).unwrap();
        assert_eq!(month_start(now), Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap());
    }

    #[tokio::test]
    async fn test_cache_put_get_invalidate() {
        let cache = StatsCache::new(MemoryStore::new(), Duration::from_secs(60));
        assert_eq!(cache.get().await, None);

        let dashboard = AdminDashboard {
            total_referrals: 3,
            monthly_revenue: 450_000,
            ..Default::default()
        };
        cache.put(&dashboard).await;
        assert_eq!(cache.get().await, Some(dashboard));

        cache.invalidate().await;
        assert_eq!(cache.get().await, None);
    }

    #[tokio::test]
    async fn test_cache_ignores_garbage() {
        let store = MemoryStore::new();
        store
            .set_ex(ADMIN_STATS_KEY, "not json", Duration::from_secs(60))
            .await
            .unwrap();
        let cache = StatsCache::new(store, Duration::from_secs(60));
        assert_eq!(cache.get().await, None);
    }
}
