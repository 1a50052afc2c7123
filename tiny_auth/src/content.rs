use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Flat key/value data describing an authenticated identity.
///
/// An empty mapping means the session is unauthenticated. The shape of the
/// values is defined by whichever authenticator produced them (tokens, user
/// ids, expiry timestamps, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionContent(Map<String, Value>);

impl SessionContent {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Convenience accessor for string-valued fields such as tokens.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Shallow merge where the entries of `overlay` win on key conflicts.
    pub fn merged_with(&self, overlay: &SessionContent) -> SessionContent {
        let mut merged = self.0.clone();
        for (key, value) in overlay.iter() {
            merged.insert(key.clone(), value.clone());
        }
        Self(merged)
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for SessionContent {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for SessionContent {
    type Error = Value;

    /// Only JSON objects are valid content; anything else is handed back.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }
}

impl From<SessionContent> for Value {
    fn from(content: SessionContent) -> Self {
        Value::Object(content.0)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for SessionContent {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}
