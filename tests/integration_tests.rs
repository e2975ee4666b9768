//! Integration tests using mock HTTP server
//!
//! Drives the public client end to end: credential storage → request
//! interceptor → mock API → refresh/replay or sign-out.

use admin_api_client::storage::{FileStore, KeyValueStore, MemoryStore};
use admin_api_client::{
    ApiClient, ClientConfig, CredentialPair, CredentialStore, Error, Navigator, Scope,
    ScopedCredentials,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Clone, Default)]
struct CountingNavigator {
    login_visits: Arc<AtomicUsize>,
}

impl Navigator for CountingNavigator {
    fn navigate(&self, target: &str) {
        assert_eq!(target, "/login");
        self.login_visits.fetch_add(1, Ordering::SeqCst);
    }
}

fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::builder()
        .base_url(format!("{}/api", server.uri()))
        .build()
}

// ============================================================================
// Example Scenarios
// ============================================================================

#[tokio::test]
async fn test_session_token_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(header("Authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "Meditation Basics"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let session = MemoryStore::new();
    session.set("token", "abc").await.unwrap();
    let credentials = ScopedCredentials::new(Arc::new(session), Arc::new(MemoryStore::new()));

    let client = ApiClient::new(config_for(&server), credentials, CountingNavigator::default())
        .unwrap();
    let products: serde_json::Value = client.get_json("/products").await.unwrap();

    assert_eq!(products[0]["name"], "Meditation Basics");
}

#[tokio::test]
async fn test_persistent_refresh_and_replay() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/courses"))
        .and(header("Authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .and(body_json(json!({"refreshToken": "r1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "new1"})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/courses"))
        .and(header("Authorization", "Bearer new1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"courses": []})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("credentials.json");
    let credentials = ScopedCredentials::new(
        Arc::new(MemoryStore::new()),
        Arc::new(FileStore::open(&file).unwrap()),
    );
    credentials
        .store_login(Scope::Persistent, &CredentialPair::new("stale", "r1"), None)
        .await
        .unwrap();

    let client = ApiClient::new(
        config_for(&server),
        credentials.clone(),
        CountingNavigator::default(),
    )
    .unwrap();
    let response = client.get("/courses").await.unwrap();
    assert_eq!(response.status(), 200);

    // The new token reached disk, in the persistent scope only
    let reopened = FileStore::open(&file).unwrap();
    assert_eq!(reopened.get("token").await.as_deref(), Some("new1"));
    assert_eq!(credentials.scope(Scope::Session).get("token").await, None);
}

#[tokio::test]
async fn test_no_tokens_401_is_rejected_without_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/dashboard"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Not authenticated"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let navigator = CountingNavigator::default();
    let client = ApiClient::new(
        config_for(&server),
        ScopedCredentials::in_memory(),
        navigator.clone(),
    )
    .unwrap();

    let err = client.get("/dashboard").await.unwrap_err();
    match err {
        Error::Api(e) => {
            assert_eq!(e.message, "Not authenticated");
            assert_eq!(e.status, Some(401));
            assert_eq!(e.data, Some(json!({"message": "Not authenticated"})));
        }
        other => panic!("expected normalized error, got {other:?}"),
    }
    assert_eq!(navigator.login_visits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_refresh_network_failure_signs_out() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/exams"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    // The refresh endpoint lives on a port nothing listens on
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let dead_base = format!("http://127.0.0.1:{port}/api");

    let session = MemoryStore::new();
    let persistent = MemoryStore::new();
    let credentials = ScopedCredentials::new(Arc::new(session.clone()), Arc::new(persistent.clone()));
    credentials
        .store_login(
            Scope::Session,
            &CredentialPair::new("t", "r"),
            Some(&json!({"name": "Admin"})),
        )
        .await
        .unwrap();
    persistent.set("user", r#"{"name":"Old"}"#).await.unwrap();

    let navigator = CountingNavigator::default();
    let client = ApiClient::new(
        ClientConfig::builder().base_url(dead_base).build(),
        credentials.clone(),
        navigator.clone(),
    )
    .unwrap();

    // Absolute URL so the request itself reaches the live server
    let err = client
        .get(&format!("{}/api/exams", server.uri()))
        .await
        .unwrap_err();

    assert!(err.is_session_expired());
    assert_eq!(err.status(), None);
    assert!(credentials.access_token().await.is_none());
    assert!(credentials.refresh_token().await.is_none());
    assert!(credentials.user().await.is_none());
    assert!(session.is_empty().await);
    assert!(persistent.is_empty().await);
    assert_eq!(navigator.login_visits.load(Ordering::SeqCst), 1);
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_refresh_url_follows_base_url() {
    let client = ApiClient::new(
        ClientConfig::builder()
            .base_url("https://admin.example.com/api")
            .build(),
        ScopedCredentials::in_memory(),
        CountingNavigator::default(),
    )
    .unwrap();
    assert_eq!(
        client.refresh_url(),
        "https://admin.example.com/api/v1/auth/refresh"
    );

    let client = ApiClient::new(
        ClientConfig::default(),
        ScopedCredentials::in_memory(),
        CountingNavigator::default(),
    )
    .unwrap();
    assert_eq!(
        client.refresh_url(),
        "https://api.example.com/api/v1/auth/refresh"
    );
}
