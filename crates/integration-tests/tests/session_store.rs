//! Session persistence and rehydration behavior.
//!
//! These run against a throwaway jar file and an API base URL that
//! refuses connections, so rehydration exercises the keep-last-known-good
//! path without a live backend.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use buildhive_storefront::api::ApiClient;
use buildhive_storefront::session::store::{
    Entry, FileStore, SameSite, SessionStore, keys,
};
use buildhive_storefront::session::{IdentitySource, SessionManager};

fn temp_jar() -> std::path::PathBuf {
    std::env::temp_dir()
        .join(format!("buildhive-test-{}", Uuid::new_v4()))
        .join("session.json")
}

fn offline_client() -> ApiClient {
    let url = "http://127.0.0.1:9/api/".parse().expect("url");
    ApiClient::new(url, Duration::from_millis(200)).expect("client")
}

#[test]
fn test_jar_persists_entries_across_reopen() {
    let path = temp_jar();

    let jar = FileStore::open(path.clone());
    jar.set(keys::AUTH_TOKEN, Entry::new("tok-abc"));
    jar.set(keys::USER_ID, Entry::new("u-1"));
    drop(jar);

    let reopened = FileStore::open(path.clone());
    assert_eq!(
        reopened.get(keys::AUTH_TOKEN).map(|e| e.value),
        Some("tok-abc".to_string())
    );
    assert_eq!(
        reopened.get(keys::USER_ID).map(|e| e.value),
        Some("u-1".to_string())
    );

    let _ = std::fs::remove_dir_all(path.parent().expect("parent"));
}

#[test]
fn test_expired_entries_are_dropped_on_reload() {
    let path = temp_jar();

    let jar = FileStore::open(path.clone());
    jar.set(
        keys::AUTH_TOKEN,
        Entry {
            value: "stale".to_string(),
            expires_at: Utc::now() - chrono::Duration::hours(1),
            same_site: SameSite::Lax,
        },
    );
    jar.set(keys::USER_ID, Entry::new("u-1"));
    drop(jar);

    let reopened = FileStore::open(path.clone());
    assert!(reopened.get(keys::AUTH_TOKEN).is_none());
    assert!(reopened.get(keys::USER_ID).is_some());

    let _ = std::fs::remove_dir_all(path.parent().expect("parent"));
}

#[tokio::test]
async fn test_initialize_without_persisted_token_stays_signed_out() {
    let path = temp_jar();
    let store = Arc::new(FileStore::open(path.clone()));
    let session = SessionManager::new(offline_client(), store);

    session.initialize().await;

    assert!(!session.is_authenticated());
    assert!(session.current_user().is_none());

    let _ = std::fs::remove_dir_all(path.parent().expect("parent"));
}

#[tokio::test]
async fn test_initialize_keeps_persisted_identity_when_backend_is_down() {
    let path = temp_jar();
    {
        let jar = FileStore::open(path.clone());
        jar.set(keys::AUTH_TOKEN, Entry::new("tok-abc"));
        jar.set(
            keys::USER_DATA,
            Entry::new(
                r#"{"id": "u-1", "email": "buyer@example.com", "fullName": "Test Buyer"}"#,
            ),
        );
    }

    let store = Arc::new(FileStore::open(path.clone()));
    let session = SessionManager::new(offline_client(), store);
    session.initialize().await;

    // The profile refresh fails against the dead backend; the persisted
    // identity survives.
    assert!(session.is_authenticated());
    assert_eq!(
        session.current_user().map(|u| u.full_name),
        Some("Test Buyer".to_string())
    );

    let _ = std::fs::remove_dir_all(path.parent().expect("parent"));
}

#[tokio::test]
async fn test_force_sign_out_clears_jar_and_identity() {
    let path = temp_jar();
    {
        let jar = FileStore::open(path.clone());
        jar.set(keys::AUTH_TOKEN, Entry::new("tok-abc"));
        jar.set(
            keys::USER_DATA,
            Entry::new(r#"{"id": "u-1", "email": "a@b.c", "fullName": "A"}"#),
        );
    }

    let store = Arc::new(FileStore::open(path.clone()));
    let session = SessionManager::new(offline_client(), Arc::clone(&store) as _);
    session.initialize().await;
    assert!(session.is_authenticated());

    session.force_sign_out();

    assert!(!session.is_authenticated());
    assert!(store.get(keys::AUTH_TOKEN).is_none());
    assert!(store.get(keys::USER_DATA).is_none());

    let _ = std::fs::remove_dir_all(path.parent().expect("parent"));
}

#[tokio::test]
async fn test_register_validates_passwords_before_any_request() {
    let store = Arc::new(FileStore::open(temp_jar()));
    let session = SessionManager::new(offline_client(), store);

    let mismatch = session
        .register("Test Buyer", "buyer@example.com", "longenough", "different", None)
        .await
        .expect_err("mismatch");
    assert_eq!(mismatch.to_string(), "Passwords do not match");

    let weak = session
        .register("Test Buyer", "buyer@example.com", "short", "short", None)
        .await
        .expect_err("too short");
    assert_eq!(
        weak.to_string(),
        "Password must be at least 8 characters"
    );
}
