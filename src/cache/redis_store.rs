//! Redis-backed cache.

use super::backend::CacheBackend;
use super::key::CacheKey;
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use std::time::Duration;
use tokio::sync::Mutex;

/// Cache backend speaking the Redis protocol.
///
/// One multiplexed connection is opened lazily and shared by every caller; it is
/// dropped after a command error so the next call reconnects.
pub struct RedisCache {
    client: redis::Client,
    connection: Mutex<Option<MultiplexedConnection>>,
}

impl RedisCache {
    /// Create a backend for `url`. No connection is made until first use, so an
    /// unreachable server surfaces as per-operation errors, not at startup.
    pub fn new(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(|e| {
            Error::configuration_with_context(
                format!("invalid Redis URL: {e}"),
                ErrorContext::new()
                    .with_field_path("REDIS_URL")
                    .with_source("redis_cache"),
            )
        })?;
        Ok(Self {
            client,
            connection: Mutex::new(None),
        })
    }

    async fn connection(&self) -> Result<MultiplexedConnection> {
        let mut slot = self.connection.lock().await;
        if let Some(conn) = slot.as_ref() {
            return Ok(conn.clone());
        }
        let conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| backend_error("connection failed", e))?;
        tracing::info!("redis cache connected");
        *slot = Some(conn.clone());
        Ok(conn)
    }

    async fn reset(&self) {
        self.connection.lock().await.take();
    }

    async fn run<T: redis::FromRedisValue>(&self, cmd: redis::Cmd, op: &str) -> Result<T> {
        let mut conn = self.connection().await?;
        match cmd.query_async(&mut conn).await {
            Ok(v) => Ok(v),
            Err(e) => {
                if e.is_io_error() || e.is_connection_dropped() {
                    self.reset().await;
                }
                Err(backend_error(op, e))
            }
        }
    }
}

fn backend_error(op: &str, e: redis::RedisError) -> Error {
    Error::cache_with_context(
        format!("{op}: {e}"),
        ErrorContext::new().with_source("redis_cache"),
    )
}

#[async_trait]
impl CacheBackend for RedisCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>> {
        let mut cmd = redis::cmd("GET");
        cmd.arg(key.as_str());
        self.run(cmd, "GET failed").await
    }

    async fn set(&self, key: &CacheKey, value: &str, ttl: Option<Duration>) -> Result<()> {
        let mut cmd = redis::cmd("SET");
        cmd.arg(key.as_str()).arg(value);
        if let Some(ttl) = ttl {
            // Redis rejects EX 0.
            cmd.arg("EX").arg(ttl.as_secs().max(1));
        }
        self.run(cmd, "SET failed").await
    }

    async fn delete(&self, key: &CacheKey) -> Result<bool> {
        let mut cmd = redis::cmd("DEL");
        cmd.arg(key.as_str());
        let removed: u64 = self.run(cmd, "DEL failed").await?;
        Ok(removed > 0)
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
