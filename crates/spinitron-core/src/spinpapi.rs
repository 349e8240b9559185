//! Signed, cached client for the SpinPapi JSON API
//!
//! Every call goes through the same pipeline: strip the caller's `cache`
//! override, pick a TTL, inject the identity fields, derive the cache key,
//! and on a miss sign and send the request.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

use crate::cache::CacheStore;
use crate::client::HttpClient;
use crate::error::{Result, SpinitronError};
use crate::gateway::{CacheGateway, CacheTtl, Fetched};
use crate::hasher::cache_key;
use crate::params::RequestParams;
use crate::signer::{RequestSigner, SignerIdentity};

/// Configuration for [`SpinPapiClient`]
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpinPapiConfig {
    /// Station identifier (e.g., "wxyz")
    pub station: String,
    /// API user name
    pub user: String,
    /// API secret used as the HMAC key
    pub secret: String,
    /// Scheme and host of the API (default: "https://spinitron.com")
    pub base_url: String,
    /// Endpoint path (default: "/public/spinpapi.php")
    pub path: String,
    /// Protocol version sent as `papiversion` (default: 2)
    pub version: u32,
}

impl SpinPapiConfig {
    /// Configuration for the production endpoint
    pub fn new(station: impl Into<String>, user: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            station: station.into(),
            user: user.into(),
            secret: secret.into(),
            ..Self::default()
        }
    }
}

impl Default for SpinPapiConfig {
    fn default() -> Self {
        Self {
            station: String::new(),
            user: String::new(),
            secret: String::new(),
            base_url: "https://spinitron.com".to_string(),
            path: "/public/spinpapi.php".to_string(),
            version: 2,
        }
    }
}

/// Remote methods with their caching policies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiMethod {
    GetSong,
    GetSongs,
    GetCurrentPlaylist,
    GetPlaylistInfo,
    GetPlaylistsInfo,
    GetShowInfo,
    GetRegularShowsInfo,
}

impl ApiMethod {
    pub const ALL: [ApiMethod; 7] = [
        ApiMethod::GetSong,
        ApiMethod::GetSongs,
        ApiMethod::GetCurrentPlaylist,
        ApiMethod::GetPlaylistInfo,
        ApiMethod::GetPlaylistsInfo,
        ApiMethod::GetShowInfo,
        ApiMethod::GetRegularShowsInfo,
    ];

    /// Wire name sent as the `method` parameter
    pub fn name(self) -> &'static str {
        match self {
            ApiMethod::GetSong => "getSong",
            ApiMethod::GetSongs => "getSongs",
            ApiMethod::GetCurrentPlaylist => "getCurrentPlaylist",
            ApiMethod::GetPlaylistInfo => "getPlaylistInfo",
            ApiMethod::GetPlaylistsInfo => "getPlaylistsInfo",
            ApiMethod::GetShowInfo => "getShowInfo",
            ApiMethod::GetRegularShowsInfo => "getRegularShowsInfo",
        }
    }

    /// TTL used when the caller gives no `cache` override
    ///
    /// Requests naming a specific song, playlist or show address
    /// near-immutable data and are kept for a week; "current" views expire
    /// within a minute.
    pub fn default_ttl(self, params: &RequestParams) -> CacheTtl {
        let week_if = |key: &str| {
            if params.contains_key(key) {
                CacheTtl::WEEK
            } else {
                CacheTtl::MINUTE
            }
        };

        match self {
            ApiMethod::GetSong => week_if("SongID"),
            ApiMethod::GetSongs => week_if("PlaylistID"),
            ApiMethod::GetCurrentPlaylist => CacheTtl::MINUTE,
            ApiMethod::GetPlaylistInfo => week_if("PlaylistID"),
            ApiMethod::GetPlaylistsInfo => CacheTtl::WEEK,
            ApiMethod::GetShowInfo => week_if("ShowID"),
            ApiMethod::GetRegularShowsInfo => CacheTtl::FIFTEEN_MINUTES,
        }
    }
}

/// Client for the signed SpinPapi endpoint
///
/// Holds its own HTTP client, signer and cache gateway; there is no shared
/// default instance.
pub struct SpinPapiClient {
    http: Arc<HttpClient>,
    gateway: CacheGateway,
    signer: RequestSigner,
    endpoint: String,
}

impl SpinPapiClient {
    /// Create a client with a default HTTP configuration
    ///
    /// # Errors
    /// - `MissingSecret` if the secret is empty
    /// - `InvalidParameter` if station, user or base URL are unusable
    pub fn new(config: SpinPapiConfig, store: Arc<dyn CacheStore>) -> Result<Self> {
        Self::with_http(config, Arc::new(HttpClient::new()?), store)
    }

    /// Create a client sharing an existing HTTP client
    pub fn with_http(
        config: SpinPapiConfig,
        http: Arc<HttpClient>,
        store: Arc<dyn CacheStore>,
    ) -> Result<Self> {
        if config.station.trim().is_empty() {
            return Err(SpinitronError::InvalidParameter(
                "station cannot be empty".to_string(),
            ));
        }
        if config.user.trim().is_empty() {
            return Err(SpinitronError::InvalidParameter(
                "API user cannot be empty".to_string(),
            ));
        }

        let base = reqwest::Url::parse(&config.base_url)
            .map_err(|e| SpinitronError::InvalidParameter(format!("base URL: {}", e)))?;
        let host = base
            .host_str()
            .ok_or_else(|| SpinitronError::InvalidParameter("base URL has no host".to_string()))?
            .to_string();

        let signer = RequestSigner::new(
            host,
            config.path.clone(),
            config.secret,
            SignerIdentity {
                station: config.station,
                user: config.user,
                version: config.version,
            },
        )?;

        Ok(Self {
            http,
            gateway: CacheGateway::new(store),
            signer,
            endpoint: format!("{}{}", config.base_url.trim_end_matches('/'), config.path),
        })
    }

    /// Information about a single logged song (`SongID`)
    pub async fn get_song(&self, params: RequestParams) -> Result<Value> {
        self.call(ApiMethod::GetSong, params).await
    }

    /// Songs of a playlist (`PlaylistID`), or the most recent ones
    pub async fn get_songs(&self, params: RequestParams) -> Result<Value> {
        self.call(ApiMethod::GetSongs, params).await
    }

    /// The `PlaylistID` of the current playlist
    pub async fn get_current_playlist(&self, params: RequestParams) -> Result<Value> {
        self.call(ApiMethod::GetCurrentPlaylist, params).await
    }

    /// Metadata of a single playlist (`PlaylistID`)
    pub async fn get_playlist_info(&self, params: RequestParams) -> Result<Value> {
        self.call(ApiMethod::GetPlaylistInfo, params).await
    }

    /// Metadata of several playlists (`UserID`, `ShowID`, `NDays`, `EndDate`, `Num`)
    pub async fn get_playlists_info(&self, params: RequestParams) -> Result<Value> {
        self.call(ApiMethod::GetPlaylistsInfo, params).await
    }

    /// Metadata of a single show (`ShowID`)
    pub async fn get_show_info(&self, params: RequestParams) -> Result<Value> {
        self.call(ApiMethod::GetShowInfo, params).await
    }

    /// Shows in the program schedule (`When`, `StartHour`)
    pub async fn get_regular_shows_info(&self, params: RequestParams) -> Result<Value> {
        self.call(ApiMethod::GetRegularShowsInfo, params).await
    }

    /// Calls a known method with its default caching policy
    pub async fn call(&self, method: ApiMethod, params: RequestParams) -> Result<Value> {
        self.execute(method.name(), params, |p| method.default_ttl(p))
            .await
    }

    /// Calls an arbitrary remote method
    ///
    /// Without a `cache` override results are kept for 30 minutes.
    pub async fn query(&self, method: &str, params: RequestParams) -> Result<Value> {
        self.execute(method, params, |_| CacheTtl::THIRTY_MINUTES)
            .await
    }

    async fn execute<P>(&self, method: &str, mut params: RequestParams, policy: P) -> Result<Value>
    where
        P: FnOnce(&RequestParams) -> CacheTtl,
    {
        let ttl = CacheGateway::resolve_ttl(&mut params, policy)?;
        self.signer.inject_identity(method, &mut params);
        let key = cache_key(&params);
        tracing::debug!(method, key = %key, ttl_ms = ttl.as_millis(), "spinpapi request");

        self.gateway
            .get_or_fetch(&key, ttl, || self.fetch(&params))
            .await
    }

    /// Signs and sends one request, decoding the JSON body
    async fn fetch(&self, params: &RequestParams) -> Result<Fetched<Value>> {
        let query = self.signer.signed_query(params, Utc::now())?;
        let url = format!("{}?{}", self.endpoint, query);

        let raw = self.http.get(&url).await?;
        let value: Value = serde_json::from_str(&raw)
            .map_err(|e| SpinitronError::ParseError(format!("invalid JSON from API: {}", e)))?;
        let cacheable = value.get("success").and_then(Value::as_bool) == Some(true);

        Ok(Fetched {
            value,
            raw,
            cacheable,
        })
    }
}
