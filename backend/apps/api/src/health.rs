//! Health Endpoint
//!
//! Probes the database and the key-value store. Either one down turns the
//! answer into 503 so load balancers stop routing here.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use platform::kv::KvStore;
use serde::Serialize;
use sqlx::PgPool;

#[derive(Clone)]
pub struct HealthState<K> {
    /// `None` when the process runs on in-memory repositories
    pub pool: Option<PgPool>,
    pub kv: K,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub cache: &'static str,
}

/// GET /health
pub async fn health<K>(State(state): State<HealthState<K>>) -> (StatusCode, Json<HealthResponse>)
where
    K: KvStore + Clone + Send + Sync + 'static,
{
    let database = match &state.pool {
        Some(pool) => match sqlx::query("SELECT 1").execute(pool).await {
            Ok(_) => "up",
            Err(e) => {
                tracing::warn!(error = %e, "Database health probe failed");
                "down"
            }
        },
        None => "disabled",
    };

    let cache = match state.kv.ping().await {
        Ok(()) => "up",
        Err(e) => {
            tracing::warn!(error = %e, "Cache health probe failed");
            "down"
        }
    };

    if database == "down" || cache == "down" {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unhealthy",
                database,
                cache,
            }),
        );
    }

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy",
            database,
            cache,
        }),
    )
}
