use thiserror::Error;

/// Failures reported by an [`Authenticator`](super::Authenticator).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AuthenticatorError {
    /// The operation was invoked on an authenticator that does not provide it
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// The backend refused the credentials or the request
    #[error("Rejected: {0}")]
    Rejected(String),

    /// The backend could not be reached
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered with something that cannot become session content
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for AuthenticatorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}
