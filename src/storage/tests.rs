//! Tests for the storage module

use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use tempfile::tempdir;

fn scoped() -> (ScopedCredentials, MemoryStore, MemoryStore) {
    let session = MemoryStore::new();
    let persistent = MemoryStore::new();
    let creds = ScopedCredentials::new(Arc::new(session.clone()), Arc::new(persistent.clone()));
    (creds, session, persistent)
}

// ============================================================================
// Backend Tests
// ============================================================================

#[tokio::test]
async fn test_memory_store_roundtrip() {
    let store = MemoryStore::new();
    assert!(store.get("token").await.is_none());

    store.set("token", "abc").await.unwrap();
    assert_eq!(store.get("token").await.as_deref(), Some("abc"));

    store.remove("token").await.unwrap();
    assert!(store.get("token").await.is_none());
    // Removing again is fine
    store.remove("token").await.unwrap();
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_file_store_persists_across_open() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("credentials.json");

    {
        let store = FileStore::open(&path).unwrap();
        store.set("token", "abc").await.unwrap();
        store.set("refreshToken", "r1").await.unwrap();
        store.remove("refreshToken").await.unwrap();
    }

    let reopened = FileStore::open(&path).unwrap();
    assert_eq!(reopened.get("token").await.as_deref(), Some("abc"));
    assert!(reopened.get("refreshToken").await.is_none());
    assert!(!dir.path().join("nested").join("credentials.json.tmp").exists());
}

#[tokio::test]
async fn test_file_store_failed_write_keeps_cache_and_disk_in_step() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("credentials.json");

    let store = FileStore::open(&path).unwrap();
    store.set("token", "old").await.unwrap();
    store.set("refreshToken", "r1").await.unwrap();

    // A directory in the temp file's place makes every write fail
    std::fs::create_dir(dir.path().join("credentials.json.tmp")).unwrap();

    let err = store.set("token", "new").await.unwrap_err();
    assert!(matches!(err, crate::error::Error::Storage { .. }));
    assert_eq!(store.get("token").await.as_deref(), Some("old"));

    let err = store.remove("refreshToken").await.unwrap_err();
    assert!(matches!(err, crate::error::Error::Storage { .. }));
    assert_eq!(store.get("refreshToken").await.as_deref(), Some("r1"));

    let reopened = FileStore::open(&path).unwrap();
    assert_eq!(reopened.get("token").await.as_deref(), Some("old"));
    assert_eq!(reopened.get("refreshToken").await.as_deref(), Some("r1"));
}

#[tokio::test]
async fn test_failed_refresh_write_does_not_leak_token() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("credentials.json");
    let creds = ScopedCredentials::new(
        Arc::new(MemoryStore::new()),
        Arc::new(FileStore::open(&path).unwrap()),
    );
    creds
        .store_login(Scope::Persistent, &CredentialPair::new("stale", "r1"), None)
        .await
        .unwrap();

    std::fs::create_dir(dir.path().join("credentials.json.tmp")).unwrap();

    assert!(creds
        .set_access_token(Scope::Persistent, "fresh")
        .await
        .is_err());
    assert_eq!(creds.access_token().await.as_deref(), Some("stale"));
}

#[tokio::test]
async fn test_file_stores_differing_by_extension_use_separate_temp_files() {
    let dir = tempdir().unwrap();
    // Blocks a temp file named by swapping the extension
    std::fs::create_dir(dir.path().join("credentials.tmp")).unwrap();

    let json_store = FileStore::open(dir.path().join("credentials.json")).unwrap();
    let yaml_store = FileStore::open(dir.path().join("credentials.yaml")).unwrap();

    json_store.set("token", "a").await.unwrap();
    yaml_store.set("token", "b").await.unwrap();

    let reopened = FileStore::open(dir.path().join("credentials.json")).unwrap();
    assert_eq!(reopened.get("token").await.as_deref(), Some("a"));
    let reopened = FileStore::open(dir.path().join("credentials.yaml")).unwrap();
    assert_eq!(reopened.get("token").await.as_deref(), Some("b"));
}

#[tokio::test]
async fn test_file_store_rejects_corrupt_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("credentials.json");
    std::fs::write(&path, "not json").unwrap();

    let err = FileStore::open(&path).unwrap_err();
    assert!(matches!(err, crate::error::Error::Storage { .. }));
}

#[tokio::test]
async fn test_file_store_empty_file_is_empty_store() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("credentials.json");
    std::fs::write(&path, "").unwrap();

    let store = FileStore::open(&path).unwrap();
    assert!(store.get("token").await.is_none());
}

// ============================================================================
// Scoped Credential Tests
// ============================================================================

#[tokio::test]
async fn test_access_token_prefers_session() {
    let (creds, session, persistent) = scoped();
    assert!(creds.access_token().await.is_none());

    persistent.set(TOKEN_KEY, "persisted").await.unwrap();
    assert_eq!(creds.access_token().await.as_deref(), Some("persisted"));

    session.set(TOKEN_KEY, "sess").await.unwrap();
    assert_eq!(creds.access_token().await.as_deref(), Some("sess"));
}

#[tokio::test]
async fn test_refresh_token_reports_scope() {
    let (creds, session, persistent) = scoped();
    assert!(creds.refresh_token().await.is_none());

    persistent.set(REFRESH_TOKEN_KEY, "r-persist").await.unwrap();
    assert_eq!(
        creds.refresh_token().await,
        Some((Scope::Persistent, "r-persist".to_string()))
    );

    session.set(REFRESH_TOKEN_KEY, "r-sess").await.unwrap();
    assert_eq!(
        creds.refresh_token().await,
        Some((Scope::Session, "r-sess".to_string()))
    );
}

#[tokio::test]
async fn test_set_access_token_touches_one_scope() {
    let (creds, session, persistent) = scoped();

    creds
        .set_access_token(Scope::Session, "new1")
        .await
        .unwrap();
    assert_eq!(session.get(TOKEN_KEY).await.as_deref(), Some("new1"));
    assert!(persistent.is_empty().await);

    creds
        .set_access_token(Scope::Persistent, "new2")
        .await
        .unwrap();
    assert_eq!(persistent.get(TOKEN_KEY).await.as_deref(), Some("new2"));
    assert_eq!(session.get(TOKEN_KEY).await.as_deref(), Some("new1"));
}

#[tokio::test]
async fn test_clear_all_wipes_both_scopes() {
    let (creds, session, persistent) = scoped();
    for store in [&session, &persistent] {
        store.set(TOKEN_KEY, "t").await.unwrap();
        store.set(REFRESH_TOKEN_KEY, "r").await.unwrap();
        store.set(USER_KEY, "{}").await.unwrap();
    }
    // Unrelated keys survive
    persistent.set("theme", "dark").await.unwrap();

    creds.clear_all().await.unwrap();

    assert!(session.is_empty().await);
    assert_eq!(persistent.len().await, 1);
    assert_eq!(persistent.get("theme").await.as_deref(), Some("dark"));
}

#[tokio::test]
async fn test_store_login_keeps_single_scope() {
    let (creds, session, persistent) = scoped();
    let user = json!({"id": 7, "name": "Admin"});

    creds
        .store_login(Scope::Session, &CredentialPair::new("a1", "r1"), Some(&user))
        .await
        .unwrap();
    assert_eq!(creds.active_scope().await, Some(Scope::Session));
    assert_eq!(creds.user().await, Some(user));
    assert!(persistent.is_empty().await);

    creds
        .store_login(Scope::Persistent, &CredentialPair::new("a2", "r2"), None)
        .await
        .unwrap();
    assert!(session.is_empty().await);
    assert_eq!(creds.active_scope().await, Some(Scope::Persistent));
    assert_eq!(
        creds.refresh_token().await,
        Some((Scope::Persistent, "r2".to_string()))
    );
    assert!(creds.user().await.is_none());
}

#[tokio::test]
async fn test_active_scope_none_when_empty() {
    let creds = ScopedCredentials::in_memory();
    assert!(creds.active_scope().await.is_none());
}

#[test]
fn test_scope_display_and_serde() {
    assert_eq!(Scope::Session.to_string(), "session");
    assert_eq!(Scope::Persistent.to_string(), "persistent");
    assert_eq!(
        serde_json::to_string(&Scope::Persistent).unwrap(),
        "\"persistent\""
    );
}

#[test]
fn test_credential_pair_wire_names() {
    let pair = CredentialPair::new("a", "r");
    assert_eq!(
        serde_json::to_value(&pair).unwrap(),
        json!({"accessToken": "a", "refreshToken": "r"})
    );
}
