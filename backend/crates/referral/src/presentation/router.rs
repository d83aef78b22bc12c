//! Referral Router

use axum::{
    Router,
    routing::{get, patch, post},
};

use platform::kv::KvStore;

use auth::domain::AuthStore;

use crate::domain::repository::ReferralStore;
use crate::presentation::handlers::{self, ReferralAppState};

/// Public student endpoints, mounted at `/students`
pub fn student_router<R, U, K>(state: ReferralAppState<R, U, K>) -> Router
where
    R: ReferralStore,
    U: AuthStore,
    K: KvStore + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/register", post(handlers::register_student::<R, U, K>))
        .route("/track-click", post(handlers::track_click::<R, U, K>))
        .with_state(state)
}

/// Public bank lookups, mounted at `/banks`
pub fn bank_router<R, U, K>(state: ReferralAppState<R, U, K>) -> Router
where
    R: ReferralStore,
    U: AuthStore,
    K: KvStore + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/", get(handlers::list_banks::<R, U, K>))
        .route("/resolve", get(handlers::resolve_account::<R, U, K>))
        .with_state(state)
}

/// Referrer endpoints, mounted at `/user`
///
/// Unguarded on its own; wrap with [`auth::guard`].
pub fn user_router<R, U, K>(state: ReferralAppState<R, U, K>) -> Router
where
    R: ReferralStore,
    U: AuthStore,
    K: KvStore + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/dashboard", get(handlers::user_dashboard::<R, U, K>))
        .route("/referrals", get(handlers::my_referrals::<R, U, K>))
        .route(
            "/payouts",
            get(handlers::my_payouts::<R, U, K>).post(handlers::request_payout::<R, U, K>),
        )
        .with_state(state)
}

/// Admin endpoints, mounted at `/admin`
///
/// Unguarded on its own; wrap with [`auth::guard`].
pub fn admin_router<R, U, K>(state: ReferralAppState<R, U, K>) -> Router
where
    R: ReferralStore,
    U: AuthStore,
    K: KvStore + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/dashboard", get(handlers::admin_dashboard::<R, U, K>))
        .route("/users/{id}/block", post(handlers::block_user::<R, U, K>))
        .route("/referrals", get(handlers::list_referrals::<R, U, K>))
        .route("/referrals/{id}/paid", post(handlers::mark_referral_paid::<R, U, K>))
        .route(
            "/referrals/{id}/status",
            patch(handlers::update_referral_status::<R, U, K>),
        )
        .route("/referrers", get(handlers::list_referrers::<R, U, K>))
        .route("/referrers/{id}/paid", post(handlers::mark_referrer_paid::<R, U, K>))
        .route("/students", get(handlers::list_students::<R, U, K>))
        .route("/payouts", get(handlers::list_payouts::<R, U, K>))
        .route("/payouts/{id}", patch(handlers::decide_payout::<R, U, K>))
        .with_state(state)
}
