use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tiny_auth::{
    GuardOutcome, HttpAuthenticator, LocalStorage, LocalStore, Navigator, RouteGuard, Session,
    Transition,
};

use crate::common::{MockBackend, load_test_environment};

fn tab(store: &LocalStore, backend: &MockBackend) -> Session {
    Session::builder()
        .storage(Arc::new(LocalStorage::new(store)))
        .authenticator(Arc::new(
            HttpAuthenticator::new(backend.url("/api/login"))
                .with_invalidate_url(backend.url("/api/logout")),
        ))
        .start()
}

async fn wait_for(session: &Session, authenticated: bool) {
    let mut rx = session.watch_authenticated();
    tokio::time::timeout(Duration::from_secs(2), rx.wait_for(|v| *v == authenticated))
        .await
        .expect("timed out waiting for the other tab")
        .expect("session state channel closed");
}

fn temp_store_path() -> PathBuf {
    std::env::temp_dir().join(format!("tiny-auth-test-{}.json", uuid::Uuid::new_v4()))
}

#[derive(Default)]
struct Router {
    visited: Vec<String>,
}

impl Navigator for Router {
    fn transition_to(&mut self, destination: &str) {
        self.visited.push(destination.to_string());
    }
}

#[tokio::test]
async fn test_login_and_logout_follow_across_tabs() {
    load_test_environment();
    let backend = MockBackend::spawn().await;
    let store = LocalStore::new();
    let tab_a = tab(&store, &backend);
    let tab_b = tab(&store, &backend);

    // Tab A logs in; tab B follows without doing anything
    tab_a
        .authenticate(&json!({"user": "frank", "pass": "secret"}))
        .await
        .unwrap();
    wait_for(&tab_b, true).await;
    assert_eq!(tab_b.content(), tab_a.content());

    // Tab B logs out; tab A follows and the backend saw one logout
    tab_b.invalidate().await.unwrap();
    wait_for(&tab_a, false).await;
    assert_eq!(backend.logouts().len(), 1);
}

#[tokio::test]
async fn test_guarded_navigation_resumes_after_login_in_other_tab() {
    // Given a tab turned away from a protected page
    load_test_environment();
    let backend = MockBackend::spawn().await;
    let store = LocalStore::new();
    let tab_a = tab(&store, &backend);
    let tab_b = tab(&store, &backend);
    let guard = RouteGuard::new(tab_a.clone()).with_login_destination("login");
    let mut router = Router::default();
    let outcome = guard.before_enter(Transition::new("reports"), &mut router);
    assert_eq!(outcome, GuardOutcome::Redirected);

    // When the user logs in from the other tab
    tab_b
        .authenticate(&json!({"user": "gina", "pass": "secret"}))
        .await
        .unwrap();
    wait_for(&tab_a, true).await;

    // Then the first tab can resume where it was going, and the guard now lets it in
    assert!(guard.resume_attempted(&mut router));
    assert_eq!(router.visited, vec!["login".to_string(), "reports".to_string()]);
    assert_eq!(
        guard.before_enter(Transition::new("reports"), &mut router),
        GuardOutcome::Proceed
    );
}

#[tokio::test]
async fn test_file_backed_store_survives_restart() {
    load_test_environment();
    let backend = MockBackend::spawn().await;
    let path = temp_store_path();

    // First run: log in
    {
        let store = LocalStore::open(&path).unwrap();
        let session = tab(&store, &backend);
        session
            .authenticate(&json!({"user": "hank", "pass": "secret"}))
            .await
            .unwrap();
    }

    // Second run: the session is restored at start-up
    let store = LocalStore::open(&path).unwrap();
    let session = tab(&store, &backend);
    assert!(session.is_authenticated());
    assert_eq!(session.get("user_id"), Some(json!("hank")));

    // Logging out removes it from the file as well
    session.invalidate().await.unwrap();
    let reopened = LocalStore::open(&path).unwrap();
    assert!(reopened.is_empty());

    std::fs::remove_file(&path).ok();
}
