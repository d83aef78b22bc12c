//! Track Click Use Case

use std::sync::Arc;

use auth::domain::{ReferralCode, UserRepository};

use crate::domain::entity::click::Click;
use crate::domain::repository::ClickRepository;
use crate::error::{ReferralError, ReferralResult};

/// Input for click tracking
#[derive(Debug, Clone)]
pub struct TrackClickInput {
    pub referral_code: String,
    pub ip_address: String,
    pub user_agent: Option<String>,
}

pub struct TrackClickUseCase<R, U> {
    repo: Arc<R>,
    users: Arc<U>,
}

impl<R, U> TrackClickUseCase<R, U>
where
    R: ClickRepository,
    U: UserRepository,
{
    pub fn new(repo: Arc<R>, users: Arc<U>) -> Self {
        Self { repo, users }
    }

    /// Record a click; unknown codes are recorded without an owner
    pub async fn execute(&self, input: TrackClickInput) -> ReferralResult<Click> {
        let code = ReferralCode::parse(&input.referral_code)
            .ok_or_else(|| ReferralError::Validation("referral_code is required".to_string()))?;

        let owner = self
            .users
            .find_by_referral_code(&code)
            .await?
            .map(|user| user.user_id);

        let click = Click::new(code, owner, input.ip_address, input.user_agent);
        self.repo.record(&click).await?;

        tracing::debug!(referral_code = %click.referral_code, owner = ?click.user_id, "Referral click recorded");

        Ok(click)
    }
}
