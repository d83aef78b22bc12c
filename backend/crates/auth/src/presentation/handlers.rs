//! HTTP Handlers

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use kernel::extract::ApiJson;
use platform::mail::Mailer;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{
    Claims, ForgotPasswordUseCase, LoginInput, LoginUseCase, ProfileUseCase, RefreshUseCase,
    RegisterInput, RegisterUseCase, ResetPasswordInput, ResetPasswordUseCase, TokenManager,
    UpdateProfileInput,
};
use crate::domain::repository::AuthStore;
use crate::error::AuthResult;
use crate::presentation::dto::{
    AuthResponse, ForgotPasswordRequest, LoginRequest, MessageResponse, RefreshRequest,
    RegisterRequest, ResetPasswordRequest, UpdateProfileRequest, UserResponse,
};

pub const FORGOT_PASSWORD_MESSAGE: &str =
    "If the email exists, a password reset link will be sent";
pub const RESET_PASSWORD_MESSAGE: &str = "Password has been reset successfully";

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R>
where
    R: AuthStore,
{
    pub repo: Arc<R>,
    pub tokens: Arc<TokenManager>,
    pub mailer: Mailer,
    pub config: Arc<AuthConfig>,
}

impl<R> AuthAppState<R>
where
    R: AuthStore,
{
    pub fn new(repo: Arc<R>, tokens: Arc<TokenManager>, mailer: Mailer, config: Arc<AuthConfig>) -> Self {
        Self {
            repo,
            tokens,
            mailer,
            config,
        }
    }
}

// ============================================================================
// Register / Login / Refresh
// ============================================================================

/// POST /api/v1/auth/register
pub async fn register<R>(
    State(state): State<AuthAppState<R>>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> AuthResult<(StatusCode, Json<AuthResponse>)>
where
    R: AuthStore,
{
    let use_case = RegisterUseCase::new(state.repo.clone(), state.tokens.clone(), state.mailer.clone());

    let input = RegisterInput {
        email: req.email,
        password: req.password,
        name: req.name,
        phone: req.phone,
        bank_name: req.bank_name,
        account_number: req.account_number,
        account_name: req.account_name,
    };

    let output = use_case.execute(input).await?;

    Ok((StatusCode::CREATED, Json(output.into())))
}

/// POST /api/v1/auth/login
pub async fn login<R>(
    State(state): State<AuthAppState<R>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> AuthResult<Json<AuthResponse>>
where
    R: AuthStore,
{
    let use_case = LoginUseCase::new(state.repo.clone(), state.tokens.clone());

    let output = use_case
        .execute(LoginInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(Json(output.into()))
}

/// POST /api/v1/auth/refresh
pub async fn refresh<R>(
    State(state): State<AuthAppState<R>>,
    ApiJson(req): ApiJson<RefreshRequest>,
) -> AuthResult<Json<AuthResponse>>
where
    R: AuthStore,
{
    let use_case = RefreshUseCase::new(state.repo.clone(), state.tokens.clone());
    let output = use_case.execute(&req.refresh_token).await?;

    Ok(Json(output.into()))
}

// ============================================================================
// Password Reset
// ============================================================================

/// POST /api/v1/auth/forgot-password
pub async fn forgot_password<R>(
    State(state): State<AuthAppState<R>>,
    ApiJson(req): ApiJson<ForgotPasswordRequest>,
) -> AuthResult<Json<MessageResponse>>
where
    R: AuthStore,
{
    let use_case =
        ForgotPasswordUseCase::new(state.repo.clone(), state.mailer.clone(), state.config.clone());
    use_case.execute(req.email).await?;

    Ok(Json(MessageResponse::new(FORGOT_PASSWORD_MESSAGE)))
}

/// POST /api/v1/auth/reset-password
pub async fn reset_password<R>(
    State(state): State<AuthAppState<R>>,
    ApiJson(req): ApiJson<ResetPasswordRequest>,
) -> AuthResult<Json<MessageResponse>>
where
    R: AuthStore,
{
    let use_case = ResetPasswordUseCase::new(state.repo.clone());
    use_case
        .execute(ResetPasswordInput {
            token: req.token,
            new_password: req.new_password,
        })
        .await?;

    Ok(Json(MessageResponse::new(RESET_PASSWORD_MESSAGE)))
}

// ============================================================================
// Profile
// ============================================================================

/// GET /api/v1/user/profile
pub async fn get_profile<R>(
    State(state): State<AuthAppState<R>>,
    Extension(claims): Extension<Claims>,
) -> AuthResult<Json<UserResponse>>
where
    R: AuthStore,
{
    let user = ProfileUseCase::new(state.repo.clone())
        .get(&claims.user_id)
        .await?;

    Ok(Json(user.into()))
}

/// PATCH /api/v1/user/profile
pub async fn update_profile<R>(
    State(state): State<AuthAppState<R>>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> AuthResult<Json<UserResponse>>
where
    R: AuthStore,
{
    let input = UpdateProfileInput {
        name: req.name,
        phone: req.phone,
        bank_name: req.bank_name,
        account_number: req.account_number,
        account_name: req.account_name,
    };

    let user = ProfileUseCase::new(state.repo.clone())
        .update(&claims.user_id, input)
        .await?;

    Ok(Json(user.into()))
}
