use serde_json::json;
use std::sync::Arc;

use tiny_auth::{
    Authenticator, AuthenticatorError, HttpAuthenticator, LocalStorage, LocalStore, Session,
    SessionError, SessionStorage, TINY_AUTH_STORAGE_KEY,
};

use crate::common::{MockBackend, load_test_environment};

fn session_for(backend: &MockBackend, store: &LocalStore) -> Session {
    let authenticator = HttpAuthenticator::new(backend.url("/api/login"))
        .with_invalidate_url(backend.url("/api/logout"));
    Session::builder()
        .storage(Arc::new(LocalStorage::new(store)))
        .authenticator(Arc::new(authenticator))
        .build()
}

#[tokio::test]
async fn test_login_with_valid_credentials() {
    load_test_environment();
    let backend = MockBackend::spawn().await;
    let store = LocalStore::new();
    let session = session_for(&backend, &store);

    let content = session
        .authenticate(&json!({"user": "alice", "pass": "secret"}))
        .await
        .expect("authentication should succeed");

    assert_eq!(content.get_str("token"), Some("T-alice"));
    assert_eq!(content.get_str("user_id"), Some("alice"));
    assert!(session.is_authenticated());
    assert_eq!(
        LocalStorage::new(&store).restore().unwrap(),
        Some(session.content())
    );
}

#[tokio::test]
async fn test_login_with_wrong_password_is_rejected() {
    load_test_environment();
    let backend = MockBackend::spawn().await;
    let store = LocalStore::new();
    let session = session_for(&backend, &store);

    let result = session
        .authenticate(&json!({"user": "alice", "pass": "wrong"}))
        .await;

    match result {
        Err(SessionError::AuthenticationFailed(AuthenticatorError::Rejected(message))) => {
            assert!(message.starts_with("401"), "unexpected message: {message}");
        }
        other => panic!("expected a rejection, got {other:?}"),
    }
    assert!(!session.is_authenticated());
    assert!(store.get_item(&TINY_AUTH_STORAGE_KEY).is_none());
}

#[tokio::test]
async fn test_non_object_response_is_invalid() {
    load_test_environment();
    let backend = MockBackend::spawn().await;
    let authenticator = HttpAuthenticator::new(backend.url("/api/login-array"));

    let result = authenticator.authenticate(&json!({})).await;

    assert!(matches!(result, Err(AuthenticatorError::InvalidResponse(_))));
}

#[tokio::test]
async fn test_invalidate_posts_content_to_backend() {
    load_test_environment();
    let backend = MockBackend::spawn().await;
    let store = LocalStore::new();
    let session = session_for(&backend, &store);
    session
        .authenticate(&json!({"user": "bob", "pass": "secret"}))
        .await
        .unwrap();

    session.invalidate().await.expect("invalidation should succeed");

    assert_eq!(
        backend.logouts(),
        vec![json!({"token": "T-bob", "user_id": "bob"})]
    );
    assert!(!session.is_authenticated());
    assert!(store.get_item(&TINY_AUTH_STORAGE_KEY).is_none());
}

#[tokio::test]
async fn test_failed_remote_logout_still_logs_out_locally() {
    load_test_environment();
    let backend = MockBackend::spawn().await;
    backend.fail_logout();
    let store = LocalStore::new();
    let session = session_for(&backend, &store);
    session
        .authenticate(&json!({"user": "bob", "pass": "secret"}))
        .await
        .unwrap();

    let result = session.invalidate().await;

    assert!(matches!(
        result,
        Err(SessionError::InvalidationFailed(AuthenticatorError::Rejected(_)))
    ));
    assert_eq!(backend.logouts().len(), 1);
    assert!(!session.is_authenticated());
    assert!(store.get_item(&TINY_AUTH_STORAGE_KEY).is_none());
}
