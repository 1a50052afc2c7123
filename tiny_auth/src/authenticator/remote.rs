use async_trait::async_trait;
use std::time::Duration;
use url::Url;

use crate::authenticator::config::TINY_AUTH_HTTP_TIMEOUT_SECS;
use crate::authenticator::errors::AuthenticatorError;
use crate::authenticator::types::{Authenticator, Credentials};
use crate::content::SessionContent;

/// Authenticator that talks JSON over HTTP.
///
/// `authenticate` POSTs the credentials to `authenticate_url`; a 2xx response
/// whose body is a JSON object becomes the session content as-is. When an
/// invalidation endpoint is configured, `invalidate` POSTs the current content
/// to it. No particular auth protocol is assumed: the backend decides what the
/// content holds.
#[derive(Debug, Clone)]
pub struct HttpAuthenticator {
    client: reqwest::Client,
    authenticate_url: Url,
    invalidate_url: Option<Url>,
}

impl HttpAuthenticator {
    pub fn new(authenticate_url: Url) -> Self {
        Self {
            client: get_client(),
            authenticate_url,
            invalidate_url: None,
        }
    }

    pub fn with_invalidate_url(mut self, invalidate_url: Url) -> Self {
        self.invalidate_url = Some(invalidate_url);
        self
    }

    /// Use a caller-provided client (proxies, TLS roots, cookie store, ...).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn authenticate_url(&self) -> &Url {
        &self.authenticate_url
    }

    pub fn invalidate_url(&self) -> Option<&Url> {
        self.invalidate_url.as_ref()
    }
}

#[async_trait]
impl Authenticator for HttpAuthenticator {
    async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<SessionContent, AuthenticatorError> {
        tracing::debug!("Authenticating against {}", self.authenticate_url);

        let response = self
            .client
            .post(self.authenticate_url.clone())
            .json(credentials)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!("Authentication rejected with {}: {}", status, body);
            return Err(AuthenticatorError::Rejected(format!("{status}: {body}")));
        }

        let body: serde_json::Value = response.json().await?;
        SessionContent::try_from(body).map_err(|other| {
            AuthenticatorError::InvalidResponse(format!("expected a JSON object, got {other}"))
        })
    }

    async fn invalidate(&self, content: &SessionContent) -> Result<(), AuthenticatorError> {
        let Some(url) = &self.invalidate_url else {
            return Ok(());
        };
        tracing::debug!("Invalidating session at {}", url);

        let response = self.client.post(url.clone()).json(content).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("Invalidation rejected with {}", status);
            return Err(AuthenticatorError::Rejected(status.to_string()));
        }
        Ok(())
    }
}

/// Creates the HTTP client used by `HttpAuthenticator`:
///
/// - `timeout`: `TINY_AUTH_HTTP_TIMEOUT_SECS` (default 30s) so a hung backend
///   cannot keep `authenticate` or `invalidate` pending forever.
/// - `pool_idle_timeout`: 90 seconds (reqwest default).
fn get_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(*TINY_AUTH_HTTP_TIMEOUT_SECS))
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!("Falling back to default HTTP client: {}", e);
            reqwest::Client::new()
        })
}
