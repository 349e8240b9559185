//! Redis-backed cache store

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

use super::CacheStore;
use crate::error::{Result, SpinitronError};

/// Cache store using Redis `GET` / `PSETEX`
///
/// Holds a `ConnectionManager`, which reconnects on its own after a dropped
/// connection. Cloning is cheap and shares the connection.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connect to a Redis server (e.g., "redis://127.0.0.1/")
    ///
    /// # Errors
    /// - `Cache` if the URL is invalid or the server is unreachable
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(|e| SpinitronError::Cache(e.to_string()))?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(|e| SpinitronError::Cache(e.to_string()))?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        conn.get(key)
            .await
            .map_err(|e| SpinitronError::Cache(e.to_string()))
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl_ms: u64) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.pset_ex::<_, _, ()>(key, value, ttl_ms)
            .await
            .map_err(|e| SpinitronError::Cache(e.to_string()))
    }
}
