//! Music catalog lookups used to enrich playlist entries
//!
//! The joiner only depends on [`CatalogLookup`]; [`ItunesCatalog`] is the
//! production implementation backed by the iTunes Search API.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::client::HttpClient;
use crate::error::{Result, SpinitronError};
use crate::types::CatalogTrack;

/// A catalog search request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    pub term: String,
    pub attribute: String,
    pub entity: String,
}

impl CatalogQuery {
    /// Search songs by title
    pub fn song_title(title: &str) -> Self {
        Self {
            term: title.to_string(),
            attribute: "songTerm".to_string(),
            entity: "song".to_string(),
        }
    }
}

/// A source of catalog matches
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// Returns candidate tracks, best match first
    async fn search(&self, query: &CatalogQuery) -> Result<Vec<CatalogTrack>>;
}

/// Configuration for [`ItunesCatalog`]
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Base URL of the search service (default: "https://itunes.apple.com")
    pub base_url: String,
    /// Search endpoint path (default: "/search")
    pub path: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://itunes.apple.com".to_string(),
            path: "/search".to_string(),
        }
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<CatalogTrack>,
}

/// iTunes Search API client
pub struct ItunesCatalog {
    http: Arc<HttpClient>,
    config: CatalogConfig,
}

impl ItunesCatalog {
    pub fn new(http: Arc<HttpClient>, config: CatalogConfig) -> Self {
        Self { http, config }
    }

    /// Builds the search URL for a query
    ///
    /// # Example
    /// ```
    /// use std::sync::Arc;
    /// use spinitron_core::{CatalogConfig, CatalogQuery, HttpClient, ItunesCatalog};
    /// let catalog = ItunesCatalog::new(Arc::new(HttpClient::new().unwrap()), CatalogConfig::default());
    /// assert_eq!(
    ///     catalog.search_url(&CatalogQuery::song_title("Blue Monday")),
    ///     "https://itunes.apple.com/search?term=Blue%20Monday&attribute=songTerm&entity=song"
    /// );
    /// ```
    pub fn search_url(&self, query: &CatalogQuery) -> String {
        format!(
            "{}{}?term={}&attribute={}&entity={}",
            self.config.base_url.trim_end_matches('/'),
            self.config.path,
            urlencoding::encode(&query.term),
            urlencoding::encode(&query.attribute),
            urlencoding::encode(&query.entity)
        )
    }
}

#[async_trait]
impl CatalogLookup for ItunesCatalog {
    async fn search(&self, query: &CatalogQuery) -> Result<Vec<CatalogTrack>> {
        let body = self
            .http
            .get(&self.search_url(query))
            .await
            .map_err(|e| SpinitronError::Catalog(e.to_string()))?;

        let response: SearchResponse =
            serde_json::from_str(&body).map_err(|e| SpinitronError::Catalog(e.to_string()))?;

        Ok(response.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientConfig;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn catalog(base_url: String) -> ItunesCatalog {
        let http = HttpClient::with_config(ClientConfig {
            max_retries: 0,
            requests_per_second: 0.0,
            ..ClientConfig::default()
        })
        .unwrap();
        ItunesCatalog::new(
            Arc::new(http),
            CatalogConfig {
                base_url,
                ..CatalogConfig::default()
            },
        )
    }

    #[test]
    fn test_song_title_query() {
        let query = CatalogQuery::song_title("Heroes");
        assert_eq!(query.attribute, "songTerm");
        assert_eq!(query.entity, "song");
    }

    #[tokio::test]
    async fn test_search_decodes_results_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("term", "Heroes"))
            .and(query_param("attribute", "songTerm"))
            .and(query_param("entity", "song"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"resultCount":2,"results":[
                    {"artistName":"Cover Band","collectionName":"Tributes"},
                    {"artistName":"David Bowie","collectionName":"Heroes","artworkUrl60":"a60"}
                ]}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let results = catalog(server.uri())
            .search(&CatalogQuery::song_title("Heroes"))
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].artist_name, "Cover Band");
        assert_eq!(results[1].artwork_url60.as_deref(), Some("a60"));
    }

    #[tokio::test]
    async fn test_search_failure_is_catalog_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = catalog(server.uri())
            .search(&CatalogQuery::song_title("Heroes"))
            .await;

        assert!(matches!(result, Err(SpinitronError::Catalog(_))));
    }

    #[tokio::test]
    async fn test_search_malformed_body_is_catalog_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let result = catalog(server.uri())
            .search(&CatalogQuery::song_title("Heroes"))
            .await;

        assert!(matches!(result, Err(SpinitronError::Catalog(_))));
    }
}
