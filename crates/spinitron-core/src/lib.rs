//! Spinitron Client Core Library
//!
//! Provides async, cached clients for a radio station's Spinitron playlist data.
//!
//! # Overview
//!
//! This crate provides two clients:
//! - [`SpinPapiClient`] for the signed SpinPapi JSON API (songs, playlists, shows)
//! - [`PlaylistClient`] for the legacy HTML playlist feed, with every entry
//!   enriched with cover art from a music catalog
//!
//! Both wrap their remote calls in the same read-through cache: the cache key
//! is a fingerprint of the sorted request parameters, and each operation has
//! its own default TTL that callers can override with a `cache` parameter
//! (milliseconds, `0` disables caching).
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use spinitron_core::{MemoryStore, RequestParams, Result, SpinPapiClient, SpinPapiConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let store = Arc::new(MemoryStore::new());
//!     let client = SpinPapiClient::new(SpinPapiConfig::new("wxyz", "dj@example.com", "secret"), store)?;
//!
//!     // Cached for a week because the playlist is named explicitly
//!     let songs = client
//!         .get_songs(RequestParams::new().with("PlaylistID", 1234))
//!         .await?;
//!     println!("{}", songs);
//!
//!     // Bypass the cache entirely
//!     let current = client
//!         .get_current_playlist(RequestParams::new().with("cache", 0))
//!         .await?;
//!     println!("{}", current);
//!
//!     Ok(())
//! }
//! ```

mod cache;
mod catalog;
mod client;
mod enrich;
mod error;
mod gateway;
mod hasher;
mod params;
pub mod parser;
mod playlist;
mod signer;
mod spinpapi;
mod types;

// Re-export cache stores
#[cfg(feature = "redis")]
pub use cache::RedisStore;
pub use cache::{CacheStore, MemoryStore, NoopStore};

// Re-export catalog types
pub use catalog::{CatalogConfig, CatalogLookup, CatalogQuery, ItunesCatalog};

// Re-export client types
pub use client::{ClientConfig, HttpClient, RateLimiter};

// Re-export enrichment join
pub use enrich::{EnrichedBatch, EnrichmentJoiner, JoinReport, Resolution};

// Re-export error types
pub use error::{Result, SpinitronError};

// Re-export caching primitives
pub use gateway::{CacheGateway, CacheTtl, Fetched};
pub use hasher::{CACHE_NAMESPACE, cache_key, fingerprint};
pub use params::{CACHE_OVERRIDE_KEY, CanonicalQuery, ParamValue, RequestParams};

// Re-export parser functions
pub use parser::parse_playlist;

// Re-export signing
pub use signer::{RequestSigner, SIGNATURE_KEY, SignerIdentity, TIMESTAMP_FORMAT};

// Re-export the two clients
pub use playlist::{PlaylistClient, PlaylistConfig, playlist_ttl};
pub use spinpapi::{ApiMethod, SpinPapiClient, SpinPapiConfig};

// Re-export data types
pub use types::{Artist, CatalogTrack, Disk, Label, PlaylistEntry, Song};
