//! HTTP Handlers

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{Extensions, HeaderMap, StatusCode};
use axum::{Extension, Json};
use kernel::extract::ApiJson;
use kernel::id::Id;
use kernel::pagination::{PageQuery, Paginated};
use platform::client::{client_identifier, connect_ip, user_agent};
use platform::kv::KvStore;
use platform::mail::Mailer;

use auth::domain::{AuthStore, UserId};
use auth::models::MessageResponse;
use auth::Claims;

use crate::application::{
    AdminDashboard, AdminDashboardUseCase, BlockUserUseCase, PayoutUseCase, ReferralAdminUseCase,
    ReferralConfig, RegisterStudentInput, RegisterStudentUseCase, StatsCache, TrackClickInput,
    TrackClickUseCase, UserDashboard, UserDashboardUseCase,
};
use crate::domain::entity::{payout::PayoutStatus, referral::ReferralStatus};
use crate::domain::repository::ReferralStore;
use crate::error::{ReferralError, ReferralResult};
use crate::infra::paystack::{PaystackClient, ResolvedAccount};
use crate::presentation::dto::{
    BankListResponse, BlockUserRequest, MarkPaidResponse, PayoutListQuery, PayoutRequest,
    PayoutResponse, ReferralRecordResponse, ReferralResponse, ReferrerSummaryResponse,
    RegisterStudentRequest, RegisterStudentResponse, ResolveAccountQuery, StatusRequest,
    StudentResponse, TrackClickRequest,
};

pub const STUDENT_REGISTERED_MESSAGE: &str = "Student registered successfully";

/// Shared state for referral handlers
#[derive(Clone)]
pub struct ReferralAppState<R, U, K>
where
    R: ReferralStore,
    U: AuthStore,
    K: KvStore + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub users: Arc<U>,
    pub cache: StatsCache<K>,
    pub paystack: Arc<PaystackClient>,
    pub mailer: Mailer,
    pub config: Arc<ReferralConfig>,
}

impl<R, U, K> ReferralAppState<R, U, K>
where
    R: ReferralStore,
    U: AuthStore,
    K: KvStore + Clone + Send + Sync + 'static,
{
    pub fn new(
        repo: Arc<R>,
        users: Arc<U>,
        cache: StatsCache<K>,
        paystack: Arc<PaystackClient>,
        mailer: Mailer,
        config: Arc<ReferralConfig>,
    ) -> Self {
        Self {
            repo,
            users,
            cache,
            paystack,
            mailer,
            config,
        }
    }
}

fn parse_id<T>(raw: &str, what: &str) -> ReferralResult<Id<T>> {
    raw.trim()
        .parse()
        .map_err(|_| ReferralError::Validation(format!("invalid {} ID", what)))
}

// ============================================================================
// Students (public)
// ============================================================================

/// POST /api/v1/students/register
pub async fn register_student<R, U, K>(
    State(state): State<ReferralAppState<R, U, K>>,
    ApiJson(req): ApiJson<RegisterStudentRequest>,
) -> ReferralResult<(StatusCode, Json<RegisterStudentResponse>)>
where
    R: ReferralStore,
    U: AuthStore,
    K: KvStore + Clone + Send + Sync + 'static,
{
    let use_case = RegisterStudentUseCase::new(
        state.repo.clone(),
        state.users.clone(),
        state.cache.clone(),
        state.mailer.clone(),
        state.config.clone(),
    );

    let input = RegisterStudentInput {
        name: req.name,
        email: req.email,
        phone: req.phone,
        course: req.course,
        referral_code: req.referral_code,
    };

    let output = use_case.execute(input).await?;

    let response = match output.referrer {
        Some(referrer) => RegisterStudentResponse {
            message: STUDENT_REGISTERED_MESSAGE.to_string(),
            referral: Some("applied".to_string()),
            referrer: Some(referrer.name.as_str().to_string()),
        },
        None => RegisterStudentResponse {
            message: STUDENT_REGISTERED_MESSAGE.to_string(),
            referral: None,
            referrer: None,
        },
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/students/track-click
pub async fn track_click<R, U, K>(
    State(state): State<ReferralAppState<R, U, K>>,
    headers: HeaderMap,
    extensions: Extensions,
    ApiJson(req): ApiJson<TrackClickRequest>,
) -> ReferralResult<Json<MessageResponse>>
where
    R: ReferralStore,
    U: AuthStore,
    K: KvStore + Clone + Send + Sync + 'static,
{
    let input = TrackClickInput {
        referral_code: req.referral_code,
        ip_address: client_identifier(&headers, connect_ip(&extensions)),
        user_agent: user_agent(&headers),
    };

    TrackClickUseCase::new(state.repo.clone(), state.users.clone())
        .execute(input)
        .await?;

    Ok(Json(MessageResponse::new("click recorded")))
}

// ============================================================================
// Banks (public)
// ============================================================================

/// GET /api/v1/banks
pub async fn list_banks<R, U, K>(
    State(state): State<ReferralAppState<R, U, K>>,
) -> ReferralResult<Json<BankListResponse>>
where
    R: ReferralStore,
    U: AuthStore,
    K: KvStore + Clone + Send + Sync + 'static,
{
    let banks = state.paystack.list_banks().await?;
    Ok(Json(BankListResponse { data: banks }))
}

/// GET /api/v1/banks/resolve
pub async fn resolve_account<R, U, K>(
    State(state): State<ReferralAppState<R, U, K>>,
    Query(query): Query<ResolveAccountQuery>,
) -> ReferralResult<Json<ResolvedAccount>>
where
    R: ReferralStore,
    U: AuthStore,
    K: KvStore + Clone + Send + Sync + 'static,
{
    let account_number = query.account_number.as_deref().map(str::trim).unwrap_or_default();
    let bank_code = query.bank_code.as_deref().map(str::trim).unwrap_or_default();

    if account_number.is_empty() || bank_code.is_empty() {
        return Err(ReferralError::Validation(
            "account_number and bank_code are required".to_string(),
        ));
    }

    let account = state.paystack.resolve_account(account_number, bank_code).await?;
    Ok(Json(account))
}

// ============================================================================
// User
// ============================================================================

/// GET /api/v1/user/dashboard
pub async fn user_dashboard<R, U, K>(
    State(state): State<ReferralAppState<R, U, K>>,
    Extension(claims): Extension<Claims>,
) -> ReferralResult<Json<UserDashboard>>
where
    R: ReferralStore,
    U: AuthStore,
    K: KvStore + Clone + Send + Sync + 'static,
{
    let dashboard = UserDashboardUseCase::new(state.repo.clone(), state.users.clone())
        .execute(&claims.user_id)
        .await?;

    Ok(Json(dashboard))
}

/// GET /api/v1/user/referrals
pub async fn my_referrals<R, U, K>(
    State(state): State<ReferralAppState<R, U, K>>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<PageQuery>,
) -> ReferralResult<Json<Paginated<ReferralResponse>>>
where
    R: ReferralStore,
    U: AuthStore,
    K: KvStore + Clone + Send + Sync + 'static,
{
    let page = UserDashboardUseCase::new(state.repo.clone(), state.users.clone())
        .referrals(&claims.user_id, query.resolve())
        .await?;

    Ok(Json(page.map(ReferralResponse::from)))
}

/// GET /api/v1/user/payouts
pub async fn my_payouts<R, U, K>(
    State(state): State<ReferralAppState<R, U, K>>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<PageQuery>,
) -> ReferralResult<Json<Paginated<PayoutResponse>>>
where
    R: ReferralStore,
    U: AuthStore,
    K: KvStore + Clone + Send + Sync + 'static,
{
    let page = PayoutUseCase::new(state.repo.clone(), state.users.clone(), state.cache.clone())
        .list_for_user(&claims.user_id, query.resolve())
        .await?;

    Ok(Json(page.map(PayoutResponse::from)))
}

/// POST /api/v1/user/payouts
pub async fn request_payout<R, U, K>(
    State(state): State<ReferralAppState<R, U, K>>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<PayoutRequest>,
) -> ReferralResult<(StatusCode, Json<PayoutResponse>)>
where
    R: ReferralStore,
    U: AuthStore,
    K: KvStore + Clone + Send + Sync + 'static,
{
    let payout = PayoutUseCase::new(state.repo.clone(), state.users.clone(), state.cache.clone())
        .request(&claims.user_id, req.amount)
        .await?;

    Ok((StatusCode::CREATED, Json(payout.into())))
}

// ============================================================================
// Admin
// ============================================================================

/// GET /api/v1/admin/dashboard
pub async fn admin_dashboard<R, U, K>(
    State(state): State<ReferralAppState<R, U, K>>,
) -> ReferralResult<Json<AdminDashboard>>
where
    R: ReferralStore,
    U: AuthStore,
    K: KvStore + Clone + Send + Sync + 'static,
{
    let dashboard = AdminDashboardUseCase::new(state.repo.clone(), state.cache.clone())
        .execute()
        .await?;

    Ok(Json(dashboard))
}

/// POST /api/v1/admin/users/{id}/block
pub async fn block_user<R, U, K>(
    State(state): State<ReferralAppState<R, U, K>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<BlockUserRequest>,
) -> ReferralResult<Json<MessageResponse>>
where
    R: ReferralStore,
    U: AuthStore,
    K: KvStore + Clone + Send + Sync + 'static,
{
    let target: UserId = parse_id(&id, "user")?;

    BlockUserUseCase::new(state.users.clone(), state.cache.clone())
        .execute(&claims.user_id, &target, req.is_blocked)
        .await?;

    let message = if req.is_blocked { "user blocked" } else { "user unblocked" };
    Ok(Json(MessageResponse::new(message)))
}

/// GET /api/v1/admin/referrals
pub async fn list_referrals<R, U, K>(
    State(state): State<ReferralAppState<R, U, K>>,
    Query(query): Query<PageQuery>,
) -> ReferralResult<Json<Paginated<ReferralRecordResponse>>>
where
    R: ReferralStore,
    U: AuthStore,
    K: KvStore + Clone + Send + Sync + 'static,
{
    let page = ReferralAdminUseCase::new(state.repo.clone(), state.cache.clone())
        .list_referrals(query.resolve())
        .await?;

    Ok(Json(page.map(ReferralRecordResponse::from)))
}

/// GET /api/v1/admin/students
pub async fn list_students<R, U, K>(
    State(state): State<ReferralAppState<R, U, K>>,
    Query(query): Query<PageQuery>,
) -> ReferralResult<Json<Paginated<StudentResponse>>>
where
    R: ReferralStore,
    U: AuthStore,
    K: KvStore + Clone + Send + Sync + 'static,
{
    let page = ReferralAdminUseCase::new(state.repo.clone(), state.cache.clone())
        .list_referrals(query.resolve())
        .await?;

    Ok(Json(page.map(StudentResponse::from)))
}

/// POST /api/v1/admin/referrals/{id}/paid
pub async fn mark_referral_paid<R, U, K>(
    State(state): State<ReferralAppState<R, U, K>>,
    Path(id): Path<String>,
) -> ReferralResult<Json<MessageResponse>>
where
    R: ReferralStore,
    U: AuthStore,
    K: KvStore + Clone + Send + Sync + 'static,
{
    let referral_id = parse_id(&id, "referral")?;

    ReferralAdminUseCase::new(state.repo.clone(), state.cache.clone())
        .set_status(&referral_id, ReferralStatus::Paid)
        .await?;

    Ok(Json(MessageResponse::new("referral marked as paid")))
}

/// PATCH /api/v1/admin/referrals/{id}/status
pub async fn update_referral_status<R, U, K>(
    State(state): State<ReferralAppState<R, U, K>>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<StatusRequest>,
) -> ReferralResult<Json<MessageResponse>>
where
    R: ReferralStore,
    U: AuthStore,
    K: KvStore + Clone + Send + Sync + 'static,
{
    let referral_id = parse_id(&id, "referral")?;
    let status = ReferralStatus::decision(&req.status).ok_or_else(|| {
        ReferralError::Validation("status must be one of: paid, rejected".to_string())
    })?;

    ReferralAdminUseCase::new(state.repo.clone(), state.cache.clone())
        .set_status(&referral_id, status)
        .await?;

    Ok(Json(MessageResponse::new("referral status updated")))
}

/// GET /api/v1/admin/referrers
pub async fn list_referrers<R, U, K>(
    State(state): State<ReferralAppState<R, U, K>>,
    Query(query): Query<PageQuery>,
) -> ReferralResult<Json<Paginated<ReferrerSummaryResponse>>>
where
    R: ReferralStore,
    U: AuthStore,
    K: KvStore + Clone + Send + Sync + 'static,
{
    let page = ReferralAdminUseCase::new(state.repo.clone(), state.cache.clone())
        .list_referrers(query.resolve())
        .await?;

    Ok(Json(page.map(ReferrerSummaryResponse::from)))
}

/// POST /api/v1/admin/referrers/{id}/paid
pub async fn mark_referrer_paid<R, U, K>(
    State(state): State<ReferralAppState<R, U, K>>,
    Path(id): Path<String>,
) -> ReferralResult<Json<MarkPaidResponse>>
where
    R: ReferralStore,
    U: AuthStore,
    K: KvStore + Clone + Send + Sync + 'static,
{
    let referrer_id: UserId = parse_id(&id, "referrer")?;

    let updated = ReferralAdminUseCase::new(state.repo.clone(), state.cache.clone())
        .mark_referrer_paid(&referrer_id)
        .await?;

    Ok(Json(MarkPaidResponse {
        message: "referrals marked as paid".to_string(),
        updated,
    }))
}

/// GET /api/v1/admin/payouts
pub async fn list_payouts<R, U, K>(
    State(state): State<ReferralAppState<R, U, K>>,
    Query(query): Query<PayoutListQuery>,
) -> ReferralResult<Json<Paginated<PayoutResponse>>>
where
    R: ReferralStore,
    U: AuthStore,
    K: KvStore + Clone + Send + Sync + 'static,
{
    let status = match query.status.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(code) => Some(PayoutStatus::from_code(code).ok_or_else(|| {
            ReferralError::Validation("status must be one of: pending, approved, rejected".to_string())
        })?),
    };

    let page = PayoutUseCase::new(state.repo.clone(), state.users.clone(), state.cache.clone())
        .list_all(status, query.page.resolve())
        .await?;

    Ok(Json(page.map(PayoutResponse::from)))
}

/// PATCH /api/v1/admin/payouts/{id}
pub async fn decide_payout<R, U, K>(
    State(state): State<ReferralAppState<R, U, K>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<StatusRequest>,
) -> ReferralResult<Json<PayoutResponse>>
where
    R: ReferralStore,
    U: AuthStore,
    K: KvStore + Clone + Send + Sync + 'static,
{
    let payout_id = parse_id(&id, "payout")?;
    let decision = PayoutStatus::decision(&req.status).ok_or_else(|| {
        ReferralError::Validation("status must be one of: approved, rejected".to_string())
    })?;

    let payout = PayoutUseCase::new(state.repo.clone(), state.users.clone(), state.cache.clone())
        .decide(&payout_id, decision, &claims.user_id)
        .await?;

    Ok(Json(payout.into()))
}
