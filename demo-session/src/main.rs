use dotenvy::dotenv;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use tiny_auth::{
    AuthorizedClient, GuardOutcome, HeaderAuthorizer, HttpAuthenticator, LocalStorage, LocalStore,
    Navigator, OriginPolicy, RequestPipeline, RouteGuard, Session, Transition,
};

mod backend;
mod server;
use server::{init_tracing, spawn_http_server};

/// Router stand-in that only logs where it is sent
struct LoggingNavigator {
    tab: &'static str,
}

impl Navigator for LoggingNavigator {
    fn transition_to(&mut self, destination: &str) {
        tracing::info!("[{}] navigating to '{}'", self.tab, destination);
    }

    fn retry(&mut self, transition: Transition) {
        tracing::info!(
            "[{}] resuming '{}' with {:?}",
            self.tab,
            transition.destination(),
            transition.params()
        );
    }
}

/// One browser tab: a session on the shared store, plus its HTTP client
struct Tab {
    name: &'static str,
    session: Session,
    client: AuthorizedClient,
}

fn open_tab(
    name: &'static str,
    store: &LocalStore,
    base_url: &Url,
) -> Result<Tab, Box<dyn std::error::Error>> {
    let pipeline = RequestPipeline::new(OriginPolicy::same_origin(base_url));
    let authenticator = HttpAuthenticator::new(base_url.join("/api/login")?)
        .with_invalidate_url(base_url.join("/api/logout")?);
    let session = Session::builder()
        .storage(Arc::new(LocalStorage::new(store)))
        .authenticator(Arc::new(authenticator))
        .authorizer(Arc::new(HeaderAuthorizer::new()))
        .install_on(&pipeline)
        .start();
    Ok(Tab {
        name,
        session,
        client: AuthorizedClient::new(pipeline),
    })
}

async fn whoami(tab: &Tab, base_url: &Url) -> Result<(), Box<dyn std::error::Error>> {
    let response = tab.client.get(base_url.join("/api/me")?).await?;
    let status = response.status();
    let body = response.text().await?;
    tracing::info!("[{}] GET /api/me -> {} {}", tab.name, status, body);
    Ok(())
}

/// Give the other tab's storage observer a moment to catch up
async fn settle() {
    tokio::time::sleep(Duration::from_millis(100)).await;
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing("demo-session");

    dotenv().ok();

    let port: u16 = std::env::var("DEMO_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3001);
    let base_url = Url::parse(&format!("http://127.0.0.1:{port}/"))?;
    let http_server = spawn_http_server(port, backend::router());
    settle().await;

    let store = LocalStore::from_env()?;
    let tab_a = open_tab("tab-a", &store, &base_url)?;
    let tab_b = open_tab("tab-b", &store, &base_url)?;
    tracing::info!(
        "Tabs opened (authenticated: {})",
        tab_a.session.is_authenticated()
    );

    // Tab A tries a protected page and is sent to login
    let guard = RouteGuard::new(tab_a.session.clone());
    let mut navigator = LoggingNavigator { tab: tab_a.name };
    let report = Transition::new("reports.show").with_param("id", "42");
    if guard.before_enter(report, &mut navigator) == GuardOutcome::Redirected {
        whoami(&tab_a, &base_url).await?;
    }

    // A wrong password is rejected and changes nothing
    if let Err(e) = tab_a
        .session
        .authenticate(&json!({"user": backend::DEMO_USER.as_str(), "pass": "wrong"}))
        .await
    {
        tracing::info!("[{}] login failed as expected: {}", tab_a.name, e);
    }

    // The right one logs both tabs in
    tab_a
        .session
        .authenticate(&json!({
            "user": backend::DEMO_USER.as_str(),
            "pass": backend::DEMO_PASSWORD.as_str(),
        }))
        .await?;
    settle().await;
    tracing::info!(
        "[{}] authenticated: {}",
        tab_b.name,
        tab_b.session.is_authenticated()
    );
    guard.resume_attempted(&mut navigator);
    whoami(&tab_a, &base_url).await?;
    whoami(&tab_b, &base_url).await?;

    tab_b
        .session
        .integrate_content([("theme", "dark")].into_iter().collect())?;
    settle().await;
    tracing::info!("[{}] content: {:?}", tab_a.name, tab_a.session.content());

    // Logging out in tab B logs tab A out too
    tab_b.session.invalidate().await?;
    settle().await;
    tracing::info!(
        "[{}] authenticated: {}",
        tab_a.name,
        tab_a.session.is_authenticated()
    );
    whoami(&tab_a, &base_url).await?;

    tab_a.session.destroy();
    tab_b.session.destroy();
    http_server.abort();
    Ok(())
}
