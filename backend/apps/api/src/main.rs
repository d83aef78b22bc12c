//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

mod app;
mod config;
mod health;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use auth::application::{SeedAdminInput, SeedAdminUseCase};
use auth::{AuthAppState, PgAuthRepository, TokenManager};
use platform::kv::{KvStore, MemoryStore, RedisStore};
use platform::mail::Mailer;
use referral::{PaystackClient, PgReferralRepository, ReferralAppState, StatsCache};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::{Services, build_router};
use crate::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api=info,auth=info,referral=info,platform=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(env = %config.app_env, port = config.port, "Configuration loaded");

    // Database connection
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_conns)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await
        .context("failed to run migrations")?;

    tracing::info!("Migrations completed");

    if config.redis_url.is_empty() {
        tracing::warn!("REDIS_URL is empty, using the in-process store");
        serve(config, pool, MemoryStore::new()).await
    } else {
        let store = RedisStore::connect(&config.redis_url)
            .await
            .context("failed to connect to Redis")?;
        tracing::info!("Connected to Redis");
        serve(config, pool, store).await
    }
}

async fn serve<K>(config: AppConfig, pool: PgPool, kv: K) -> anyhow::Result<()>
where
    K: KvStore + Clone + Send + Sync + 'static,
{
    let auth_repo = Arc::new(PgAuthRepository::new(pool.clone()));
    let referral_repo = Arc::new(PgReferralRepository::new(pool.clone()));

    // Startup cleanup: remove expired reset tokens
    // Errors here should not prevent server startup
    match auth_repo.cleanup_expired().await {
        Ok(deleted) => {
            tracing::info!(tokens_deleted = deleted, "Reset token cleanup completed");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Reset token cleanup failed, continuing anyway");
        }
    }

    if config.admin.password.is_empty() {
        tracing::info!("ADMIN_PASSWORD not set, skipping admin seed");
    } else {
        SeedAdminUseCase::new(auth_repo.clone())
            .execute(SeedAdminInput {
                email: config.admin.email.clone(),
                password: config.admin.password.clone(),
                name: config.admin.name.clone(),
            })
            .await
            .map_err(|e| anyhow::anyhow!("failed to seed admin account: {}", e))?;
    }

    let mailer = if config.mail.is_configured() {
        Mailer::from_config(&config.mail).context("invalid SMTP configuration")?
    } else {
        tracing::warn!("SMTP credentials not set, outgoing mail is logged only");
        Mailer::log_only()
    };

    if config.referral.paystack.secret_key.is_empty() {
        if config.is_production() {
            tracing::warn!("PAYSTACK_SECRET_KEY not set, bank endpoints will fail");
        } else {
            tracing::debug!("PAYSTACK_SECRET_KEY not set");
        }
    }

    let tokens = Arc::new(TokenManager::new(&config.auth.tokens));
    let paystack = PaystackClient::new(config.referral.paystack.clone())
        .map_err(|e| anyhow::anyhow!("failed to build Paystack client: {}", e))?;

    let services = Services {
        auth: AuthAppState::new(
            auth_repo.clone(),
            tokens.clone(),
            mailer.clone(),
            Arc::new(config.auth.clone()),
        ),
        referral: ReferralAppState::new(
            referral_repo,
            auth_repo,
            StatsCache::new(kv.clone(), config.referral.dashboard_cache_ttl),
            Arc::new(paystack),
            mailer,
            Arc::new(config.referral.clone()),
        ),
        tokens,
        kv,
        pool: Some(pool.clone()),
    };

    let app = build_router(services, &config);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    pool.close().await;
    tracing::info!("Server stopped");

    Ok(())
}

/// Resolves on SIGINT or, on Unix, SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}

#[cfg(test)]
mod tests;
