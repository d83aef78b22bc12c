//! Rate Limiting Infrastructure
//!
//! Fixed-window counters keyed by `(scope, client)` on top of a [`KvStore`].
//!
//! Algorithm per request:
//! 1. `INCR` the window key
//! 2. on the first hit of a window, set the key's TTL to the window length
//! 3. above the limit, reject with 429 and `Retry-After`
//!
//! The limiter fails open: a store error lets the request through.

use std::time::Duration;

use axum::extract::{OriginalUri, Request, State};
use axum::http::{HeaderName, HeaderValue, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use kernel::error::app_error::AppError;

use crate::client::{client_identifier, connect_ip};
use crate::kv::KvStore;

pub const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in the window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    /// Strict preset for credential endpoints (5 per minute)
    pub fn authentication() -> Self {
        Self::new(5, 60)
    }

    /// Whole seconds, never zero, for the `Retry-After` header
    pub fn window_secs(&self) -> u64 {
        self.window.as_secs().max(1)
    }
}

/// What the limiter concluded for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed { limit: u32, remaining: u32 },
    Limited { limit: u32, retry_after_secs: u64 },
    /// Store unreachable; request passes without quota headers
    Bypassed,
}

/// Which requests share a counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitScope {
    /// One counter per client across every route
    Global,
    /// One counter per client per route path
    PerRoute,
}

impl RateLimitScope {
    fn rejection_message(&self) -> &'static str {
        match self {
            RateLimitScope::Global => "rate limit exceeded",
            RateLimitScope::PerRoute => "too many authentication attempts, please try again later",
        }
    }
}

/// Fixed-window limiter; clone it into `from_fn_with_state`
#[derive(Clone)]
pub struct RateLimiter<S> {
    store: S,
    config: RateLimitConfig,
    scope: RateLimitScope,
}

impl<S> RateLimiter<S>
where
    S: KvStore + Clone + Send + Sync + 'static,
{
    pub fn new(store: S, config: RateLimitConfig, scope: RateLimitScope) -> Self {
        Self {
            store,
            config,
            scope,
        }
    }

    /// Permissive limiter applied to every route
    pub fn global(store: S, config: RateLimitConfig) -> Self {
        Self::new(store, config, RateLimitScope::Global)
    }

    /// Strict limiter for authentication endpoints
    pub fn per_route(store: S, config: RateLimitConfig) -> Self {
        Self::new(store, config, RateLimitScope::PerRoute)
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Counter key for a request
    pub fn key(&self, path: &str, client: &str) -> String {
        match self.scope {
            RateLimitScope::Global => format!("rate_limit:{}", client),
            RateLimitScope::PerRoute => format!("auth_rate_limit:{}:{}", path, client),
        }
    }

    /// Count one hit against `key`
    pub async fn check(&self, key: &str) -> RateLimitDecision {
        let count = match self.store.incr(key).await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!(error = %e, key, "Rate limit store unavailable, allowing request");
                return RateLimitDecision::Bypassed;
            }
        };

        if count == 1 {
            if let Err(e) = self.store.expire(key, self.config.window).await {
                tracing::warn!(error = %e, key, "Failed to set rate limit window");
            }
        }

        let limit = self.config.max_requests;
        if count > i64::from(limit) {
            tracing::debug!(key, count, limit, "Rate limit exceeded");
            return RateLimitDecision::Limited {
                limit,
                retry_after_secs: self.config.window_secs(),
            };
        }

        RateLimitDecision::Allowed {
            limit,
            remaining: limit.saturating_sub(count as u32),
        }
    }
}

/// Middleware applying a [`RateLimiter`]
pub async fn enforce<S>(
    State(limiter): State<RateLimiter<S>>,
    req: Request,
    next: Next,
) -> Response
where
    S: KvStore + Clone + Send + Sync + 'static,
{
    let client = client_identifier(req.headers(), connect_ip(req.extensions()));
    let path = req
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.path().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let key = limiter.key(&path, &client);

    match limiter.check(&key).await {
        RateLimitDecision::Allowed { limit, remaining } => {
            let mut response = next.run(req).await;
            let headers = response.headers_mut();
            headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(limit));
            headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(remaining));
            response
        }
        RateLimitDecision::Limited {
            limit,
            retry_after_secs,
        } => {
            tracing::warn!(client = %client, path = %path, "Request rate limited");
            let mut response =
                AppError::too_many_requests(limiter.scope.rejection_message()).into_response();
            let headers = response.headers_mut();
            headers.insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
            headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(limit));
            headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(0u32));
            response
        }
        RateLimitDecision::Bypassed => next.run(req).await,
    }
}
