use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Json conversion(Serde) error: {0}")]
    Serde(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        Self::Request(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}
