//! Command implementations for the spinitron CLI
//!
//! Each command builds an explicit client from the parsed arguments,
//! runs one operation and returns its JSON result.

use std::sync::Arc;

use serde_json::Value;
use spinitron_core::{
    ApiMethod, CacheStore, MemoryStore, ParamValue, PlaylistClient, PlaylistConfig, RequestParams,
    Result, SpinPapiClient, SpinPapiConfig, SpinitronError,
};

/// Parses repeated `KEY=VALUE` arguments plus an optional TTL override
///
/// Numeric values are sent as integers, everything else as text.
///
/// # Errors
/// Returns `InvalidParameter` for an argument without `=` or with an empty key
pub fn parse_params(raw: &[String], cache: Option<i64>) -> Result<RequestParams> {
    let mut params = RequestParams::new();

    for arg in raw {
        let (key, value) = arg.split_once('=').ok_or_else(|| {
            SpinitronError::InvalidParameter(format!("expected KEY=VALUE, got '{}'", arg))
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(SpinitronError::InvalidParameter(format!(
                "empty key in '{}'",
                arg
            )));
        }
        params.insert(key, ParamValue::parse_loose(value));
    }

    if let Some(ttl) = cache {
        params.insert("cache", ttl);
    }

    Ok(params)
}

/// Opens the cache store
///
/// Uses Redis when a URL is given (and the `redis` feature is enabled),
/// otherwise a process-local memory store.
pub async fn open_store(redis_url: Option<&str>) -> Result<Arc<dyn CacheStore>> {
    match redis_url {
        #[cfg(feature = "redis")]
        Some(url) => Ok(Arc::new(spinitron_core::RedisStore::connect(url).await?)),
        #[cfg(not(feature = "redis"))]
        Some(_) => Err(SpinitronError::InvalidParameter(
            "built without the `redis` feature".to_string(),
        )),
        None => Ok(Arc::new(MemoryStore::new())),
    }
}

/// Calls a SpinPapi method by enum
pub async fn call_api(
    config: SpinPapiConfig,
    store: Arc<dyn CacheStore>,
    method: ApiMethod,
    params: RequestParams,
) -> Result<Value> {
    let client = SpinPapiClient::new(config, store)?;
    client.call(method, params).await
}

/// Calls a SpinPapi method by wire name
pub async fn call_raw(
    config: SpinPapiConfig,
    store: Arc<dyn CacheStore>,
    method: &str,
    params: RequestParams,
) -> Result<Value> {
    let client = SpinPapiClient::new(config, store)?;
    client.query(method, params).await
}

/// Scrapes and enriches the station playlist
pub async fn scrape_playlist(
    config: PlaylistConfig,
    store: Arc<dyn CacheStore>,
    params: RequestParams,
) -> Result<Value> {
    let client = PlaylistClient::new(config, store)?;
    let entries = client.get_playlist(params).await?;
    serde_json::to_value(entries)
        .map_err(|e| SpinitronError::ParseError(format!("cannot encode playlist: {}", e)))
}
