//! Router Assembly
//!
//! Mounts every crate router under `/api/v1` and wraps the result in the
//! shared middleware stack.

use std::sync::Arc;

use auth::domain::{AuthStore, UserRole};
use auth::{AuthAppState, TokenManager, auth_router, guard, profile_router};
use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use kernel::error::app_error::AppError;
use platform::kv::KvStore;
use platform::rate_limit::{RateLimiter, X_RATELIMIT_LIMIT, X_RATELIMIT_REMAINING, enforce};
use referral::{ReferralAppState, ReferralStore, admin_router, bank_router, student_router, user_router};
use sqlx::PgPool;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer, ExposeHeaders};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::health::{HealthState, health};

/// Largest accepted request body
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Everything the routers need, already wired to concrete stores
pub struct Services<A, R, K>
where
    A: AuthStore,
    R: ReferralStore,
    K: KvStore + Clone + Send + Sync + 'static,
{
    pub auth: AuthAppState<A>,
    pub referral: ReferralAppState<R, A, K>,
    pub tokens: Arc<TokenManager>,
    pub kv: K,
    pub pool: Option<PgPool>,
}

pub fn build_router<A, R, K>(services: Services<A, R, K>, config: &AppConfig) -> Router
where
    A: AuthStore,
    R: ReferralStore,
    K: KvStore + Clone + Send + Sync + 'static,
{
    let Services {
        auth,
        referral,
        tokens,
        kv,
        pool,
    } = services;

    let auth_limiter = RateLimiter::per_route(kv.clone(), config.auth_rate_limit.clone());
    let global_limiter = RateLimiter::global(kv.clone(), config.rate_limit.clone());

    let user_routes = profile_router(auth.clone()).merge(user_router(referral.clone()));

    let api = Router::new()
        .nest(
            "/auth",
            auth_router(auth).layer(from_fn_with_state(auth_limiter, enforce::<K>)),
        )
        .nest("/students", student_router(referral.clone()))
        .nest("/banks", bank_router(referral.clone()))
        .nest("/user", guard(user_routes, tokens.clone(), UserRole::User))
        .nest("/admin", guard(admin_router(referral), tokens, UserRole::Admin));

    let health_routes = Router::new()
        .route("/health", get(health::<K>))
        .with_state(HealthState { pool, kv });

    // Layers run bottom-up: the last one added sees the request first
    Router::new()
        .nest("/api/v1", api)
        .merge(health_routes)
        .fallback(|| async { AppError::not_found("route not found") })
        .layer(from_fn_with_state(global_limiter, enforce::<K>))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .layer(cors(&config.cors_origins))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

fn cors(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring unparsable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .expose_headers(ExposeHeaders::list([
            X_RATELIMIT_LIMIT,
            X_RATELIMIT_REMAINING,
            header::RETRY_AFTER,
        ]))
        .allow_credentials(true)
}
