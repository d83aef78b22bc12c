//! Key-Value Store
//!
//! Narrow counter + TTL + string cache contract used by the rate limiter
//! and the dashboard cache. Two backends:
//! - [`RedisStore`] for production (shared across instances)
//! - [`MemoryStore`] for tests and single-process development

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::time::Instant;

/// Key-value store errors
#[derive(Debug, Error)]
pub enum KvError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("value at `{0}` is not an integer")]
    NotAnInteger(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type KvResult<T> = Result<T, KvError>;

/// Storage backend contract
#[trait_variant::make(KvStore: Send)]
pub trait LocalKvStore {
    /// Atomically increment the counter at `key`, returning the new value
    async fn incr(&self, key: &str) -> KvResult<i64>;

    /// Set a time-to-live on an existing key
    async fn expire(&self, key: &str, ttl: Duration) -> KvResult<()>;

    async fn get(&self, key: &str) -> KvResult<Option<String>>;

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> KvResult<()>;

    async fn del(&self, key: &str) -> KvResult<()>;

    /// Liveness probe for the health endpoint
    async fn ping(&self) -> KvResult<()>;
}

// ============================================================================
// Redis
// ============================================================================

/// Redis-backed store
///
/// `ConnectionManager` reconnects on its own and is cheap to clone.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    pub async fn connect(url: &str) -> KvResult<Self> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }
}

impl KvStore for RedisStore {
    async fn incr(&self, key: &str) -> KvResult<i64> {
        let mut conn = self.conn.clone();
        let value: i64 = conn.incr(key, 1).await?;
        Ok(value)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> KvResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.expire(key, ttl.as_secs().max(1) as i64).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> KvResult<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> KvResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(key, value, ttl.as_secs().max(1)).await?;
        Ok(())
    }

    async fn del(&self, key: &str) -> KvResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(key).await?;
        Ok(())
    }

    async fn ping(&self) -> KvResult<()> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

// ============================================================================
// In-memory
// ============================================================================

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

/// Process-local store with lazy expiry
///
/// Uses `tokio::time::Instant`, so paused-clock tests can step past a window.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    async fn incr(&self, key: &str) -> KvResult<i64> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;

        let current = match entries.get(key) {
            Some(entry) if entry.is_live(now) => entry.clone(),
            _ => Entry {
                value: "0".to_string(),
                expires_at: None,
            },
        };

        let next = current
            .value
            .parse::<i64>()
            .map_err(|_| KvError::NotAnInteger(key.to_string()))?
            + 1;

        entries.insert(
            key.to_string(),
            Entry {
                value: next.to_string(),
                expires_at: current.expires_at,
            },
        );
        Ok(next)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> KvResult<()> {
        if let Some(entry) = self.entries.write().await.get_mut(key) {
            entry.expires_at = Some(Instant::now() + ttl);
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> KvResult<Option<String>> {
        let now = Instant::now();
        Ok(self
            .entries
            .read()
            .await
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone()))
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> KvResult<()> {
        self.entries.write().await.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Some(Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn del(&self, key: &str) -> KvResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn ping(&self) -> KvResult<()> {
        Ok(())
    }
}
