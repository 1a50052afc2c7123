use thiserror::Error;

use crate::authenticator::AuthenticatorError;
use crate::storage::StorageError;

/// Errors surfaced by session transitions.
///
/// `Clone` because concurrent `invalidate()` callers share one outcome.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    /// The configured authenticator does not provide the operation
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// The authenticator rejected the credentials; content is unchanged
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(AuthenticatorError),

    /// The operation is not possible in the current state
    #[error("Illegal state: {0}")]
    IllegalState(String),

    /// Remote invalidation failed; local content has been cleared anyway
    #[error("Invalidation failed: {0}")]
    InvalidationFailed(AuthenticatorError),

    /// Storage could not mirror the transition
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl SessionError {
    pub(crate) fn from_authentication(err: AuthenticatorError) -> Self {
        match err {
            AuthenticatorError::NotImplemented(msg) => Self::NotImplemented(msg),
            other => Self::AuthenticationFailed(other),
        }
    }

    /// Log the error and return self
    ///
    /// Allows `map_err(|e| ... .log())` at the point where an error leaves the
    /// session, so every surfaced failure is logged exactly once.
    pub fn log(self) -> Self {
        match &self {
            Self::NotImplemented(msg) => tracing::error!("Not implemented: {}", msg),
            Self::AuthenticationFailed(err) => tracing::warn!("Authentication failed: {}", err),
            Self::IllegalState(msg) => tracing::error!("Illegal state: {}", msg),
            Self::InvalidationFailed(err) => {
                tracing::warn!("Invalidation failed, local session cleared: {}", err)
            }
            Self::Storage(err) => tracing::error!("Storage error: {}", err),
        }
        self
    }
}
