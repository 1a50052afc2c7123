use async_trait::async_trait;

use crate::authenticator::errors::AuthenticatorError;
use crate::content::SessionContent;

/// Whatever the application collects from the user (username/password, a
/// one-time code, ...). Its shape is a contract between the application and
/// its authenticator.
pub type Credentials = serde_json::Value;

/// Credential verification and remote invalidation.
#[async_trait]
pub trait Authenticator: Send + Sync + 'static {
    /// Verify `credentials` and resolve with the data that becomes the new
    /// session content (tokens, user id, expiry, ...).
    async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<SessionContent, AuthenticatorError>;

    /// Give the backend a chance to invalidate the session. Local content is
    /// cleared by the session whatever this returns.
    async fn invalidate(&self, _content: &SessionContent) -> Result<(), AuthenticatorError> {
        Ok(())
    }
}

/// Default authenticator used when the application configures none.
///
/// It cannot verify anything: `authenticate` always fails with
/// `NotImplemented`, while `invalidate` keeps the accept-immediately default.
#[derive(Debug, Default, Clone, Copy)]
pub struct BaseAuthenticator;

#[async_trait]
impl Authenticator for BaseAuthenticator {
    async fn authenticate(
        &self,
        _credentials: &Credentials,
    ) -> Result<SessionContent, AuthenticatorError> {
        Err(AuthenticatorError::NotImplemented(
            "authenticate is not provided by the base authenticator".to_string(),
        ))
    }
}
