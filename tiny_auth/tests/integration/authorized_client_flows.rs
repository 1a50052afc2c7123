use http::HeaderName;
use serde_json::{Value, json};
use std::sync::Arc;

use tiny_auth::{
    AuthorizedClient, HeaderAuthorizer, HttpAuthenticator, LocalStorage, LocalStore,
    OriginPolicy, RequestPipeline, Session, SessionError,
};

use crate::common::mock_backend::CAPTURE_HEADER;
use crate::common::{MockBackend, load_test_environment};

struct App {
    backend: MockBackend,
    client: AuthorizedClient,
    session: Session,
}

/// An application served from the mock backend's origin.
async fn app(authorizer: HeaderAuthorizer) -> App {
    load_test_environment();
    let backend = MockBackend::spawn().await;
    let pipeline = RequestPipeline::new(OriginPolicy::same_origin(&backend.base_url));
    let session = Session::builder()
        .storage(Arc::new(LocalStorage::new(&LocalStore::new())))
        .authenticator(Arc::new(
            HttpAuthenticator::new(backend.url("/api/login"))
                .with_invalidate_url(backend.url("/api/logout")),
        ))
        .authorizer(Arc::new(authorizer))
        .install_on(&pipeline)
        .build();
    App {
        backend,
        client: AuthorizedClient::new(pipeline),
        session,
    }
}

async fn authorization_seen_by(client: &AuthorizedClient, backend: &MockBackend) -> Value {
    let response = client
        .get(backend.url("/api/me"))
        .await
        .expect("request should succeed");
    let body: Value = response.json().await.expect("JSON body");
    body["authorization"].clone()
}

#[tokio::test]
async fn test_requests_carry_bearer_token_while_authenticated() {
    let app = app(HeaderAuthorizer::new()).await;

    // Unauthenticated: nothing added
    assert_eq!(
        authorization_seen_by(&app.client, &app.backend).await,
        Value::Null
    );

    // Authenticated: the token goes out as a bearer header
    app.session
        .authenticate(&json!({"user": "carol", "pass": "secret"}))
        .await
        .unwrap();
    assert_eq!(
        authorization_seen_by(&app.client, &app.backend).await,
        json!("Bearer T-carol")
    );

    // Logged out: nothing added again
    app.session.invalidate().await.unwrap();
    assert_eq!(
        authorization_seen_by(&app.client, &app.backend).await,
        Value::Null
    );
}

#[tokio::test]
async fn test_cross_origin_requests_are_not_authorized() {
    // Given an authenticated app and a third-party service on another origin
    let app = app(HeaderAuthorizer::new()).await;
    let third_party = MockBackend::spawn().await;
    app.session
        .authenticate(&json!({"user": "carol", "pass": "secret"}))
        .await
        .unwrap();

    // When calling the third party through the same client
    let seen = authorization_seen_by(&app.client, &third_party).await;

    // Then the token is not leaked
    assert_eq!(seen, Value::Null);
    assert_eq!(third_party.seen_authorization(), vec![None]);
}

#[tokio::test]
async fn test_allow_listed_origin_is_authorized() {
    load_test_environment();
    let backend = MockBackend::spawn().await;
    let api = MockBackend::spawn().await;
    let pipeline = RequestPipeline::new(OriginPolicy::allow_list([&backend.base_url, &api.base_url]));
    let session = Session::builder()
        .authenticator(Arc::new(HttpAuthenticator::new(backend.url("/api/login"))))
        .authorizer(Arc::new(HeaderAuthorizer::new()))
        .install_on(&pipeline)
        .build();
    let client = AuthorizedClient::new(pipeline);
    session
        .authenticate(&json!({"user": "dave", "pass": "secret"}))
        .await
        .unwrap();

    assert_eq!(
        authorization_seen_by(&client, &api).await,
        json!("Bearer T-dave")
    );
}

#[tokio::test]
async fn test_header_login_flow() {
    // Given an authorizer capturing grants from a response header
    let app = app(
        HeaderAuthorizer::new().capturing_from(HeaderName::from_static(CAPTURE_HEADER)),
    )
    .await;

    // Login before any grant was seen is an illegal state
    assert!(matches!(
        app.session.login(Default::default()),
        Err(SessionError::IllegalState(_))
    ));

    // When a login request through the client returns a grant header
    let response = app
        .client
        .post_json(
            app.backend.url("/api/login-header"),
            &json!({"user": "erin", "pass": "secret"}),
        )
        .await
        .unwrap();
    assert!(response.status().is_success());

    // Then login adopts it, merged with the extra data
    app.session
        .login([("user_id", "erin")].into_iter().collect())
        .unwrap();
    assert_eq!(app.session.get("token"), Some(json!("H-erin")));
    assert_eq!(app.session.get("user_id"), Some(json!("erin")));
    assert_eq!(
        authorization_seen_by(&app.client, &app.backend).await,
        json!("Bearer H-erin")
    );

    // And invalidating drops the captured grant too
    app.session.invalidate().await.unwrap();
    assert!(matches!(
        app.session.login(Default::default()),
        Err(SessionError::IllegalState(_))
    ));
}

#[tokio::test]
async fn test_rejected_login_response_is_not_captured() {
    let app = app(
        HeaderAuthorizer::new().capturing_from(HeaderName::from_static(CAPTURE_HEADER)),
    )
    .await;

    let response = app
        .client
        .post_json(
            app.backend.url("/api/login-header"),
            &json!({"user": "erin", "pass": "wrong"}),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), http::StatusCode::UNAUTHORIZED);
    assert!(app.session.login(Default::default()).is_err());
}
