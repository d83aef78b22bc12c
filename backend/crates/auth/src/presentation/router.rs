//! Auth Router

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use std::sync::Arc;

use crate::application::TokenManager;
use crate::domain::repository::AuthStore;
use crate::domain::value_object::user_role::UserRole;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{require_bearer, require_role};

/// Public credential endpoints, mounted at `/auth`
pub fn auth_router<R>(state: AuthAppState<R>) -> Router
where
    R: AuthStore,
{
    Router::new()
        .route("/register", post(handlers::register::<R>))
        .route("/login", post(handlers::login::<R>))
        .route("/refresh", post(handlers::refresh::<R>))
        .route("/forgot-password", post(handlers::forgot_password::<R>))
        .route("/reset-password", post(handlers::reset_password::<R>))
        .with_state(state)
}

/// Profile endpoints, merged into the `/user` router
///
/// Unguarded on its own; wrap with [`guard`].
pub fn profile_router<R>(state: AuthAppState<R>) -> Router
where
    R: AuthStore,
{
    Router::new()
        .route(
            "/profile",
            get(handlers::get_profile::<R>).patch(handlers::update_profile::<R>),
        )
        .with_state(state)
}

/// Wrap `router` so every route requires a bearer token for exactly `role`
pub fn guard(router: Router, tokens: Arc<TokenManager>, role: UserRole) -> Router {
    router
        .layer(from_fn_with_state(role, require_role))
        .layer(from_fn_with_state(tokens, require_bearer))
}
