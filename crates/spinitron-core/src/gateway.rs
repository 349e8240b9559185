//! Read-through / write-through cache around remote calls
//!
//! The gateway checks the store, falls back to the supplied fetch on a miss,
//! and writes successful results back under the chosen TTL. Store failures
//! never fail the call.

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::cache::CacheStore;
use crate::error::Result;
use crate::params::RequestParams;

/// Time-to-live for a cache entry, in milliseconds
///
/// Zero means "do not cache".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CacheTtl(u64);

impl CacheTtl {
    pub const DISABLED: CacheTtl = CacheTtl(0);
    pub const THIRTY_SECONDS: CacheTtl = CacheTtl(30_000);
    pub const MINUTE: CacheTtl = CacheTtl(60_000);
    pub const FIFTEEN_MINUTES: CacheTtl = CacheTtl(900_000);
    pub const THIRTY_MINUTES: CacheTtl = CacheTtl(1_800_000);
    pub const HOUR: CacheTtl = CacheTtl(3_600_000);
    pub const WEEK: CacheTtl = CacheTtl(604_800_000);

    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    pub const fn as_millis(self) -> u64 {
        self.0
    }

    pub const fn is_disabled(self) -> bool {
        self.0 == 0
    }
}

/// Result of an underlying fetch
///
/// `raw` is what gets stored; it must deserialize back into `value`.
#[derive(Debug, Clone)]
pub struct Fetched<T> {
    pub value: T,
    pub raw: String,
    /// Whether the protocol marked this result as a success worth caching
    pub cacheable: bool,
}

/// Get-or-compute-and-store wrapper over a [`CacheStore`]
///
/// Does not de-duplicate concurrent misses for the same key: two
/// simultaneous misses both run their fetch, and the last write wins.
#[derive(Clone)]
pub struct CacheGateway {
    store: Arc<dyn CacheStore>,
}

impl CacheGateway {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Chooses the TTL for a call
    ///
    /// Strips the caller's `cache` override from `params` and uses it verbatim
    /// if present. Otherwise `policy` is applied to the remaining parameters.
    ///
    /// # Errors
    /// - `InvalidTtl` if the override is negative or not an integer
    pub fn resolve_ttl<P>(params: &mut RequestParams, policy: P) -> Result<CacheTtl>
    where
        P: FnOnce(&RequestParams) -> CacheTtl,
    {
        match params.take_cache_override()? {
            Some(ttl) => Ok(ttl),
            None => Ok(policy(params)),
        }
    }

    /// Returns the cached value for `key`, or runs `fetch` and caches its result
    ///
    /// With a disabled TTL the store is neither read nor written. Fetch errors
    /// are returned unchanged and nothing is stored.
    pub async fn get_or_fetch<T, F, Fut>(&self, key: &str, ttl: CacheTtl, fetch: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Fetched<T>>>,
    {
        if !ttl.is_disabled()
            && let Some(value) = self.lookup::<T>(key).await
        {
            tracing::debug!(key, "cache hit");
            return Ok(value);
        }

        tracing::debug!(key, ttl_ms = ttl.as_millis(), "cache miss");
        let fetched = fetch().await?;

        if fetched.cacheable && !ttl.is_disabled() {
            if let Err(e) = self
                .store
                .set_with_ttl(key, &fetched.raw, ttl.as_millis())
                .await
            {
                tracing::warn!(key, error = %e, "failed to write cache entry");
            }
        }

        Ok(fetched.value)
    }

    /// Reads and decodes a cached entry; any failure counts as a miss
    async fn lookup<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let cached = match self.store.get(key).await {
            Ok(cached) => cached?,
            Err(e) => {
                tracing::warn!(key, error = %e, "cache store unavailable, fetching directly");
                return None;
            }
        };

        match serde_json::from_str(&cached) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding undecodable cache entry");
                None
            }
        }
    }
}
