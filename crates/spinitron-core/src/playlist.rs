//! Cached client for the legacy HTML playlist feed
//!
//! Fetches the station's playlist page, extracts its entries, enriches
//! them through the music catalog and caches the finished batch.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::cache::CacheStore;
use crate::catalog::{CatalogConfig, CatalogLookup, ItunesCatalog};
use crate::client::HttpClient;
use crate::enrich::EnrichmentJoiner;
use crate::error::{Result, SpinitronError};
use crate::gateway::{CacheGateway, CacheTtl, Fetched};
use crate::hasher::cache_key;
use crate::params::{CanonicalQuery, RequestParams};
use crate::parser::parse_playlist;
use crate::types::PlaylistEntry;

/// Configuration for [`PlaylistClient`]
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaylistConfig {
    /// Station identifier (e.g., "wxyz")
    pub station: String,
    /// Scheme and host of the feed (default: "https://spinitron.com")
    pub base_url: String,
    /// Feed path (default: "/radio/playlist.php")
    pub path: String,
    /// Per-lookup catalog deadline in seconds (default: 10)
    pub lookup_timeout_secs: u64,
    /// Maximum concurrent catalog lookups (default: 8)
    pub max_in_flight: usize,
    /// Catalog service used for enrichment
    pub catalog: CatalogConfig,
}

impl PlaylistConfig {
    /// Configuration for the production feed
    pub fn new(station: impl Into<String>) -> Self {
        Self {
            station: station.into(),
            ..Self::default()
        }
    }
}

impl Default for PlaylistConfig {
    fn default() -> Self {
        Self {
            station: String::new(),
            base_url: "https://spinitron.com".to_string(),
            path: "/radio/playlist.php".to_string(),
            lookup_timeout_secs: 10,
            max_in_flight: 8,
            catalog: CatalogConfig::default(),
        }
    }
}

/// Default TTL for a playlist request
///
/// An unqualified request means "what is on air now" and changes quickly;
/// anything narrower is cached for an hour.
pub fn playlist_ttl(params: &RequestParams) -> CacheTtl {
    if params.is_empty() {
        CacheTtl::THIRTY_SECONDS
    } else {
        CacheTtl::HOUR
    }
}

/// Client for the scraped playlist feed
pub struct PlaylistClient {
    http: Arc<HttpClient>,
    gateway: CacheGateway,
    joiner: EnrichmentJoiner,
    station: String,
    endpoint: String,
}

impl PlaylistClient {
    /// Create a client enriching through the configured iTunes catalog
    ///
    /// # Errors
    /// - `InvalidParameter` if the station is empty
    /// - `HttpError` if HTTP client initialization fails
    pub fn new(config: PlaylistConfig, store: Arc<dyn CacheStore>) -> Result<Self> {
        let http = Arc::new(HttpClient::new()?);
        let catalog = Arc::new(ItunesCatalog::new(http.clone(), config.catalog.clone()));
        Self::with_parts(config, http, store, catalog)
    }

    /// Create a client from explicit collaborators
    pub fn with_parts(
        config: PlaylistConfig,
        http: Arc<HttpClient>,
        store: Arc<dyn CacheStore>,
        catalog: Arc<dyn CatalogLookup>,
    ) -> Result<Self> {
        if config.station.trim().is_empty() {
            return Err(SpinitronError::InvalidParameter(
                "station cannot be empty".to_string(),
            ));
        }

        let joiner = EnrichmentJoiner::new(
            catalog,
            Duration::from_secs(config.lookup_timeout_secs),
            config.max_in_flight,
        );

        Ok(Self {
            http,
            gateway: CacheGateway::new(store),
            joiner,
            station: config.station,
            endpoint: format!("{}{}", config.base_url.trim_end_matches('/'), config.path),
        })
    }

    /// Fetches, enriches and caches the station playlist
    ///
    /// # Arguments
    /// * `params` - Feed parameters (e.g., `num` for the item count) plus an
    ///   optional `cache` TTL override in milliseconds
    ///
    /// # Returns
    /// Entries in document order, with catalog artwork where a match was found
    ///
    /// # Errors
    /// - `InvalidTtl` if the `cache` override is unusable
    /// - `Status` / `HttpError` if the feed cannot be fetched
    pub async fn get_playlist(&self, mut params: RequestParams) -> Result<Vec<PlaylistEntry>> {
        let ttl = CacheGateway::resolve_ttl(&mut params, playlist_ttl)?;
        params.insert("ptype", "s");
        params.insert("station", self.station.as_str());
        let key = cache_key(&params);
        tracing::debug!(key = %key, ttl_ms = ttl.as_millis(), "playlist request");

        self.gateway
            .get_or_fetch(&key, ttl, || self.fetch(&params))
            .await
    }

    async fn fetch(&self, params: &RequestParams) -> Result<Fetched<Vec<PlaylistEntry>>> {
        let url = format!("{}?{}", self.endpoint, CanonicalQuery::from_params(params));
        let html = self.http.get(&url).await?;

        let entries = parse_playlist(&html)?;
        let batch = self.joiner.join(entries).await;

        let raw = serde_json::to_string(&batch.entries)
            .map_err(|e| SpinitronError::ParseError(format!("cannot encode playlist: {}", e)))?;

        Ok(Fetched {
            value: batch.entries,
            raw,
            cacheable: true,
        })
    }
}
