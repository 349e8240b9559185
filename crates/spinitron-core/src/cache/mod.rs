//! Key-value cache stores
//!
//! The gateway only needs `get` and `set_with_ttl`. Stores are best-effort:
//! the gateway logs their failures and carries on without caching.

mod memory;
#[cfg(feature = "redis")]
mod redis_store;

use async_trait::async_trait;

use crate::error::Result;

pub use memory::MemoryStore;
#[cfg(feature = "redis")]
pub use redis_store::RedisStore;

/// An external key-value store with per-entry expiry
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the stored value, or `None` if absent or expired
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key` for `ttl_ms` milliseconds
    async fn set_with_ttl(&self, key: &str, value: &str, ttl_ms: u64) -> Result<()>;
}

/// Store that never holds anything
///
/// Every read misses and every write is discarded.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStore;

#[async_trait]
impl CacheStore for NoopStore {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn set_with_ttl(&self, _key: &str, _value: &str, _ttl_ms: u64) -> Result<()> {
        Ok(())
    }
}
