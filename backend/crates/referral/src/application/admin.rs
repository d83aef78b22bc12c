//! Admin Use Cases
//!
//! Referral decisions, bulk payment, user blocking and the paginated
//! admin listings. Every state change drops the cached admin dashboard.

use std::sync::Arc;

use kernel::id::ReferralId;
use kernel::pagination::{PageRequest, Paginated};
use platform::kv::KvStore;

use auth::domain::{UserId, UserRepository};

use crate::application::dashboard::StatsCache;
use crate::domain::entity::referral::{ReferralRecord, ReferralStatus};
use crate::domain::entity::stats::ReferrerSummary;
use crate::domain::repository::{ReferralRepository, Transition};
use crate::error::{ReferralError, ReferralResult};

pub struct ReferralAdminUseCase<R, K> {
    repo: Arc<R>,
    cache: StatsCache<K>,
}

impl<R, K> ReferralAdminUseCase<R, K>
where
    R: ReferralRepository,
    K: KvStore + Clone + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, cache: StatsCache<K>) -> Self {
        Self { repo, cache }
    }

    /// Move a pending referral to `paid` or `rejected`
    pub async fn set_status(&self, id: &ReferralId, status: ReferralStatus) -> ReferralResult<()> {
        if status == ReferralStatus::Pending {
            return Err(ReferralError::Validation(
                "status must be one of: paid, rejected".to_string(),
            ));
        }

        match self.repo.update_status(id, status).await? {
            Transition::Applied => {}
            Transition::Missing => return Err(ReferralError::ReferralNotFound),
            Transition::Stale(current) => {
                return Err(ReferralError::ReferralAlreadyDecided(current.to_string()));
            }
        }

        self.cache.invalidate().await;
        tracing::info!(referral_id = %id, status = %status, "Referral status updated");
        Ok(())
    }

    /// Mark every pending referral of one referrer as paid
    pub async fn mark_referrer_paid(&self, referrer_id: &UserId) -> ReferralResult<u64> {
        let updated = self.repo.mark_all_paid_for_referrer(referrer_id).await?;

        if updated > 0 {
            self.cache.invalidate().await;
        }

        tracing::info!(referrer_id = %referrer_id, updated, "Referrer referrals marked as paid");
        Ok(updated)
    }

    pub async fn list_referrals(&self, page: PageRequest) -> ReferralResult<Paginated<ReferralRecord>> {
        let (records, total) = self.repo.list_all(page).await?;
        Ok(Paginated::new(records, page, total))
    }

    pub async fn list_referrers(&self, page: PageRequest) -> ReferralResult<Paginated<ReferrerSummary>> {
        let (summaries, total) = self.repo.referrer_summaries(page).await?;
        Ok(Paginated::new(summaries, page, total))
    }
}

pub struct BlockUserUseCase<U, K> {
    users: Arc<U>,
    cache: StatsCache<K>,
}

impl<U, K> BlockUserUseCase<U, K>
where
    U: UserRepository,
    K: KvStore + Clone + Send + Sync + 'static,
{
    pub fn new(users: Arc<U>, cache: StatsCache<K>) -> Self {
        Self { users, cache }
    }

    /// Block or unblock `target`; admins cannot block themselves
    pub async fn execute(&self, admin_id: &UserId, target: &UserId, blocked: bool) -> ReferralResult<()> {
        if admin_id == target && blocked {
            return Err(ReferralError::CannotBlockSelf);
        }

        if !self.users.set_blocked(target, blocked).await? {
            return Err(ReferralError::UserNotFound);
        }

        self.cache.invalidate().await;
        tracing::info!(admin_id = %admin_id, user_id = %target, blocked, "User block flag changed");
        Ok(())
    }
}
