//! End-to-end tests for the signed API client against a mock server

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use spinitron_core::{
    CacheStore, CanonicalQuery, ClientConfig, HttpClient, MemoryStore, RequestParams,
    RequestSigner, Result, SignerIdentity, SpinPapiClient, SpinPapiConfig, SpinitronError,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENDPOINT: &str = "/public/spinpapi.php";

fn http() -> Arc<HttpClient> {
    Arc::new(
        HttpClient::with_config(ClientConfig {
            requests_per_second: 0.0,
            max_retries: 0,
            ..ClientConfig::default()
        })
        .expect("client should build"),
    )
}

fn config(server: &MockServer) -> SpinPapiConfig {
    SpinPapiConfig {
        base_url: server.uri(),
        ..SpinPapiConfig::new("wxyz", "dj@example.com", "sekrit")
    }
}

fn client(server: &MockServer, store: Arc<dyn CacheStore>) -> SpinPapiClient {
    SpinPapiClient::with_http(config(server), http(), store).expect("client should build")
}

fn ok_body() -> serde_json::Value {
    json!({
        "success": true,
        "results": { "SongID": 42, "SongName": "Heroes", "ArtistName": "David Bowie" }
    })
}

struct UnreachableStore;

#[async_trait]
impl CacheStore for UnreachableStore {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(SpinitronError::Cache("connection refused".to_string()))
    }

    async fn set_with_ttl(&self, _key: &str, _value: &str, _ttl_ms: u64) -> Result<()> {
        Err(SpinitronError::Cache("connection refused".to_string()))
    }
}

#[tokio::test]
async fn repeated_call_hits_remote_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .and(query_param("method", "getSong"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(1)
        .mount(&server)
        .await;

    let store = MemoryStore::new();
    let client = client(&server, Arc::new(store.clone()));

    let first = client
        .get_song(RequestParams::new().with("SongID", 42))
        .await
        .unwrap();
    let second = client
        .get_song(RequestParams::new().with("SongID", 42))
        .await
        .unwrap();

    assert_eq!(first, ok_body());
    assert_eq!(first, second);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn zero_cache_override_never_writes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(2)
        .mount(&server)
        .await;

    let store = MemoryStore::new();
    let client = client(&server, Arc::new(store.clone()));

    for _ in 0..2 {
        client
            .get_current_playlist(RequestParams::new().with("cache", 0))
            .await
            .unwrap();
    }

    assert!(store.is_empty().await);
}

#[tokio::test]
async fn unsuccessful_response_is_returned_but_not_cached() {
    let server = MockServer::start().await;
    let body = json!({ "success": false, "errors": ["Invalid station"] });
    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .expect(2)
        .mount(&server)
        .await;

    let store = MemoryStore::new();
    let client = client(&server, Arc::new(store.clone()));

    for _ in 0..2 {
        let value = client.get_show_info(RequestParams::new()).await.unwrap();
        assert_eq!(value, body);
    }

    assert!(store.is_empty().await);
}

#[tokio::test]
async fn non_200_status_surfaces_as_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let store = MemoryStore::new();
    let client = client(&server, Arc::new(store.clone()));

    let result = client.get_songs(RequestParams::new()).await;

    assert!(matches!(result, Err(SpinitronError::Status { status: 403, .. })));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn malformed_body_surfaces_as_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let store = MemoryStore::new();
    let client = client(&server, Arc::new(store.clone()));

    let result = client.get_playlist_info(RequestParams::new()).await;

    assert!(matches!(result, Err(SpinitronError::ParseError(_))));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn negative_cache_override_fails_before_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(0)
        .mount(&server)
        .await;

    let client = client(&server, Arc::new(MemoryStore::new()));
    let result = client
        .get_regular_shows_info(RequestParams::new().with("cache", -100))
        .await;

    assert!(matches!(result, Err(SpinitronError::InvalidTtl(_))));
}

#[tokio::test]
async fn missing_secret_fails_without_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = SpinPapiConfig {
        secret: String::new(),
        ..config(&server)
    };
    let result = SpinPapiClient::with_http(config, http(), Arc::new(MemoryStore::new()));

    assert!(matches!(result, Err(SpinitronError::MissingSecret)));
}

#[tokio::test]
async fn unreachable_store_degrades_to_direct_calls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(2)
        .mount(&server)
        .await;

    let client = client(&server, Arc::new(UnreachableStore));

    for _ in 0..2 {
        let value = client
            .get_song(RequestParams::new().with("SongID", 42))
            .await
            .unwrap();
        assert_eq!(value, ok_body());
    }
}

#[tokio::test]
async fn outbound_query_is_sorted_and_verifiably_signed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .and(query_param("method", "getSongs"))
        .and(query_param("station", "wxyz"))
        .and(query_param("papiversion", "2"))
        .and(query_param("papiuser", "dj@example.com"))
        .and(query_param("PlaylistID", "1234"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, Arc::new(MemoryStore::new()));
    client
        .get_songs(RequestParams::new().with("PlaylistID", 1234).with("cache", 5_000))
        .await
        .unwrap();

    let requests = server.received_requests().await.expect("recording enabled");
    let query = requests[0].url.query().expect("query string").to_string();

    let (canonical, signature) = query
        .rsplit_once("&signature=")
        .expect("signature is the last parameter");

    let pairs: Vec<(String, String)> = canonical
        .split('&')
        .map(|pair| {
            let (k, v) = pair.split_once('=').expect("key=value");
            (
                urlencoding::decode(k).unwrap().into_owned(),
                urlencoding::decode(v).unwrap().into_owned(),
            )
        })
        .collect();

    let keys: Vec<&str> = pairs.iter().map(|(k, _)| k.as_str()).collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
    assert!(!keys.contains(&"cache"));
    assert!(keys.contains(&"timestamp"));

    let params: RequestParams = pairs.into_iter().collect();
    let signer = RequestSigner::new(
        "127.0.0.1",
        ENDPOINT,
        "sekrit",
        SignerIdentity {
            station: "wxyz".to_string(),
            user: "dj@example.com".to_string(),
            version: 2,
        },
    )
    .unwrap();
    let expected = signer.sign(&CanonicalQuery::from_params(&params)).unwrap();

    assert_eq!(urlencoding::decode(signature).unwrap().into_owned(), expected);
}

#[tokio::test]
async fn different_parameters_use_different_entries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(2)
        .mount(&server)
        .await;

    let store = MemoryStore::new();
    let client = client(&server, Arc::new(store.clone()));

    client
        .get_song(RequestParams::new().with("SongID", 1))
        .await
        .unwrap();
    client
        .get_song(RequestParams::new().with("SongID", 2))
        .await
        .unwrap();

    assert_eq!(store.len().await, 2);
}
