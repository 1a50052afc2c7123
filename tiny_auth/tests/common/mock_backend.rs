//! Axum-based mock authentication backend
//!
//! Each test spawns its own instance on an ephemeral port, so tests never
//! share state and two instances are two distinct origins.

use axum::{
    Router,
    extract::{Json, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use url::Url;

pub const VALID_PASSWORD: &str = "secret";
pub const CAPTURE_HEADER: &str = "x-auth-token";

#[derive(Default)]
struct Recorded {
    logouts: Vec<Value>,
    seen_authorization: Vec<Option<String>>,
    fail_logout: bool,
}

#[derive(Clone)]
pub struct MockBackend {
    pub base_url: Url,
    recorded: Arc<Mutex<Recorded>>,
}

impl MockBackend {
    pub async fn spawn() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener.local_addr().expect("No local address");

        let backend = Self {
            base_url: Url::parse(&format!("http://{addr}/")).expect("Invalid base URL"),
            recorded: Arc::new(Mutex::new(Recorded::default())),
        };

        let app = Router::new()
            .route("/api/login", post(login))
            .route("/api/login-header", post(login_header))
            .route("/api/login-array", post(login_array))
            .route("/api/logout", post(logout))
            .route("/api/me", get(me))
            .with_state(backend.clone());

        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Mock backend stopped");
        });

        backend
    }

    pub fn url(&self, path: &str) -> Url {
        self.base_url.join(path).expect("Invalid path")
    }

    pub fn logouts(&self) -> Vec<Value> {
        self.recorded.lock().unwrap().logouts.clone()
    }

    pub fn seen_authorization(&self) -> Vec<Option<String>> {
        self.recorded.lock().unwrap().seen_authorization.clone()
    }

    pub fn fail_logout(&self) {
        self.recorded.lock().unwrap().fail_logout = true;
    }
}

fn check_credentials(body: &Value) -> Result<&str, Response> {
    let user = body.get("user").and_then(Value::as_str);
    let pass = body.get("pass").and_then(Value::as_str);
    match (user, pass) {
        (Some(user), Some(VALID_PASSWORD)) => Ok(user),
        _ => Err((StatusCode::UNAUTHORIZED, "invalid credentials").into_response()),
    }
}

async fn login(Json(body): Json<Value>) -> Response {
    match check_credentials(&body) {
        Ok(user) => Json(json!({"token": format!("T-{user}"), "user_id": user})).into_response(),
        Err(response) => response,
    }
}

/// Grants through a response header instead of the body
async fn login_header(Json(body): Json<Value>) -> Response {
    match check_credentials(&body) {
        Ok(user) => (
            [(CAPTURE_HEADER, format!("Bearer H-{user}"))],
            Json(json!({"ok": true})),
        )
            .into_response(),
        Err(response) => response,
    }
}

async fn login_array() -> Json<Value> {
    Json(json!(["not", "an", "object"]))
}

async fn logout(State(backend): State<MockBackend>, Json(body): Json<Value>) -> StatusCode {
    let mut recorded = backend.recorded.lock().unwrap();
    recorded.logouts.push(body);
    if recorded.fail_logout {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::NO_CONTENT
    }
}

async fn me(State(backend): State<MockBackend>, headers: HeaderMap) -> Json<Value> {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    backend
        .recorded
        .lock()
        .unwrap()
        .seen_authorization
        .push(authorization.clone());
    Json(json!({ "authorization": authorization }))
}
