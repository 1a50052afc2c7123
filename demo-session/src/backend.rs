use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use subtle::ConstantTimeEq;
use tokio::sync::Mutex;

/// Demo account name. Default: "demo"
pub(crate) static DEMO_USER: LazyLock<String> =
    LazyLock::new(|| std::env::var("DEMO_USER").unwrap_or_else(|_| "demo".to_string()));

/// Demo account password. Default: "demo"
pub(crate) static DEMO_PASSWORD: LazyLock<String> =
    LazyLock::new(|| std::env::var("DEMO_PASSWORD").unwrap_or_else(|_| "demo".to_string()));

/// Issued tokens and the user each belongs to
#[derive(Clone, Default)]
struct Tokens(Arc<Mutex<HashMap<String, String>>>);

#[derive(Deserialize)]
struct LoginForm {
    user: String,
    pass: String,
}

pub(crate) fn router() -> Router<()> {
    Router::new()
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/me", get(me))
        .with_state(Tokens::default())
}

async fn login(State(tokens): State<Tokens>, Json(form): Json<LoginForm>) -> Response {
    let user_ok = form.user.as_bytes().ct_eq(DEMO_USER.as_bytes());
    let pass_ok = form.pass.as_bytes().ct_eq(DEMO_PASSWORD.as_bytes());
    if !bool::from(user_ok & pass_ok) {
        tracing::info!("Rejected login for {}", form.user);
        return (StatusCode::UNAUTHORIZED, "invalid credentials").into_response();
    }

    let token = uuid::Uuid::new_v4().to_string();
    tokens.0.lock().await.insert(token.clone(), form.user.clone());
    tracing::info!("Issued token for {}", form.user);
    Json(json!({ "token": token, "user_id": form.user })).into_response()
}

async fn logout(State(tokens): State<Tokens>, Json(content): Json<Value>) -> StatusCode {
    let Some(token) = content.get("token").and_then(Value::as_str) else {
        return StatusCode::BAD_REQUEST;
    };
    match tokens.0.lock().await.remove(token) {
        Some(user) => {
            tracing::info!("Revoked token of {}", user);
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}

async fn me(State(tokens): State<Tokens>, headers: HeaderMap) -> Response {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    let Some(token) = token else {
        return (StatusCode::UNAUTHORIZED, "missing bearer token").into_response();
    };

    match tokens.0.lock().await.get(token) {
        Some(user) => Json(json!({ "user_id": user })).into_response(),
        None => (StatusCode::UNAUTHORIZED, "unknown token").into_response(),
    }
}
