//! Payout Use Cases

use std::sync::Arc;

use chrono::Utc;
use kernel::id::PayoutId;
use kernel::pagination::{PageRequest, Paginated};
use platform::kv::KvStore;

use auth::domain::{UserId, UserRepository};

use crate::application::dashboard::StatsCache;
use crate::domain::entity::payout::{Payout, PayoutRequestOutcome, PayoutStatus};
use crate::domain::repository::{PayoutRepository, Transition};
use crate::error::{ReferralError, ReferralResult};

pub struct PayoutUseCase<R, U, K> {
    repo: Arc<R>,
    users: Arc<U>,
    cache: StatsCache<K>,
}

impl<R, U, K> PayoutUseCase<R, U, K>
where
    R: PayoutRepository,
    U: UserRepository,
    K: KvStore + Clone + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, users: Arc<U>, cache: StatsCache<K>) -> Self {
        Self { repo, users, cache }
    }

    /// A referrer asks to withdraw `amount` from their pending earnings
    pub async fn request(&self, user_id: &UserId, amount: i64) -> ReferralResult<Payout> {
        if amount <= 0 {
            return Err(ReferralError::Validation("amount must be greater than zero".to_string()));
        }

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(ReferralError::UserNotFound)?;

        if !user.bank.is_complete() {
            return Err(ReferralError::BankDetailsRequired);
        }

        let payout = Payout::request(*user_id, amount);
        match self.repo.request(&payout).await? {
            PayoutRequestOutcome::Created => {}
            PayoutRequestOutcome::Insufficient { available } => {
                tracing::debug!(user_id = %user_id, amount, available, "Payout exceeds balance");
                return Err(ReferralError::InsufficientBalance { available });
            }
        }

        self.cache.invalidate().await;
        tracing::info!(payout_id = %payout.id, user_id = %user_id, amount, "Payout requested");
        Ok(payout)
    }

    pub async fn list_for_user(&self, user_id: &UserId, page: PageRequest) -> ReferralResult<Paginated<Payout>> {
        let (payouts, total) = self.repo.list_by_user(user_id, page).await?;
        Ok(Paginated::new(payouts, page, total))
    }

    pub async fn list_all(
        &self,
        status: Option<PayoutStatus>,
        page: PageRequest,
    ) -> ReferralResult<Paginated<Payout>> {
        let (payouts, total) = self.repo.list_payouts(status, page).await?;
        Ok(Paginated::new(payouts, page, total))
    }

    /// Approve or reject a pending payout
    pub async fn decide(&self, id: &PayoutId, decision: PayoutStatus, admin_id: &UserId) -> ReferralResult<Payout> {
        if decision == PayoutStatus::Pending {
            return Err(ReferralError::Validation(
                "status must be one of: approved, rejected".to_string(),
            ));
        }

        match self.repo.decide(id, decision, admin_id, Utc::now()).await? {
            Transition::Applied => {}
            Transition::Missing => return Err(ReferralError::PayoutNotFound),
            Transition::Stale(current) => {
                return Err(ReferralError::PayoutAlreadyDecided(current.to_string()));
            }
        }

        self.cache.invalidate().await;
        tracing::info!(payout_id = %id, admin_id = %admin_id, status = %decision, "Payout decided");

        self.repo
            .find_payout(id)
            .await?
            .ok_or(ReferralError::PayoutNotFound)
    }
}
