use serde::{Deserialize, Serialize};

/// Navigation token recorded when an unauthenticated user is turned away.
///
/// The session treats it as opaque; the host router decides what the
/// destination string means and how to replay it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    destination: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    params: Vec<(String, String)>,
}

impl Transition {
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            params: Vec::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}
