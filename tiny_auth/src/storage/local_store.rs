use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::storage::config::{TINY_AUTH_LOCAL_STORE_PATH, TINY_AUTH_STORAGE_CHANNEL_CAPACITY};
use crate::storage::errors::StorageError;
use crate::storage::types::StorageChange;

/// Process-wide string key/value store shared by every tab of an application.
///
/// This plays the part of the browser's `localStorage`: any number of
/// [`LocalStorage`](super::LocalStorage) handles ("tabs") attach to one store,
/// and a mutation made through one tab is announced to all the others. Writes
/// that leave the stored value unchanged are silent, as are removals of keys
/// that do not exist.
///
/// Optionally the store is mirrored to a JSON file so that its contents survive
/// process restarts.
#[derive(Clone)]
pub struct LocalStore {
    inner: Arc<LocalStoreInner>,
}

struct LocalStoreInner {
    items: Mutex<HashMap<String, String>>,
    tabs: Mutex<Vec<Tab>>,
    path: Option<PathBuf>,
}

struct Tab {
    id: Uuid,
    sender: broadcast::Sender<StorageChange>,
}

impl LocalStore {
    /// Create an empty, memory-only store.
    pub fn new() -> Self {
        tracing::info!("Creating new in-memory local store");
        Self::with_items(HashMap::new(), None)
    }

    /// Open a file-backed store, loading existing entries when the file exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let items = match std::fs::read(&path) {
            Ok(bytes) if bytes.is_empty() => HashMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::info!(
            "Opened file-backed local store at {} with {} entries",
            path.display(),
            items.len()
        );
        Ok(Self::with_items(items, Some(path)))
    }

    /// File-backed when `TINY_AUTH_LOCAL_STORE_PATH` is set, memory-only otherwise.
    pub fn from_env() -> Result<Self, StorageError> {
        match TINY_AUTH_LOCAL_STORE_PATH.as_deref() {
            Some(path) => Self::open(path),
            None => Ok(Self::new()),
        }
    }

    fn with_items(items: HashMap<String, String>, path: Option<PathBuf>) -> Self {
        Self {
            inner: Arc::new(LocalStoreInner {
                items: Mutex::new(items),
                tabs: Mutex::new(Vec::new()),
                path,
            }),
        }
    }

    pub fn get_item(&self, key: &str) -> Option<String> {
        self.inner.items.lock().get(key).cloned()
    }

    /// Set a value as an external actor: every attached tab is notified.
    pub fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.set_item_from(None, key, value)
    }

    /// Remove a value as an external actor: every attached tab is notified.
    pub fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.remove_item_from(None, key)
    }

    /// Remove every entry. Tabs are notified once with `key: None`.
    pub fn clear(&self) -> Result<(), StorageError> {
        let mut items = self.inner.items.lock();
        if items.is_empty() {
            return Ok(());
        }
        let previous = std::mem::take(&mut *items);
        if let Err(e) = self.flush(&items) {
            *items = previous;
            return Err(e);
        }
        drop(items);

        self.notify(None, StorageChange { key: None });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.inner.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.items.lock().is_empty()
    }

    pub(super) fn set_item_from(
        &self,
        source: Option<Uuid>,
        key: &str,
        value: &str,
    ) -> Result<(), StorageError> {
        let mut items = self.inner.items.lock();
        if items.get(key).map(String::as_str) == Some(value) {
            return Ok(());
        }

        let previous = items.insert(key.to_string(), value.to_string());
        if let Err(e) = self.flush(&items) {
            match previous {
                Some(previous) => items.insert(key.to_string(), previous),
                None => items.remove(key),
            };
            return Err(e);
        }
        drop(items);

        self.notify(
            source,
            StorageChange {
                key: Some(key.to_string()),
            },
        );
        Ok(())
    }

    pub(super) fn remove_item_from(
        &self,
        source: Option<Uuid>,
        key: &str,
    ) -> Result<(), StorageError> {
        let mut items = self.inner.items.lock();
        let Some(previous) = items.remove(key) else {
            return Ok(());
        };

        if let Err(e) = self.flush(&items) {
            items.insert(key.to_string(), previous);
            return Err(e);
        }
        drop(items);

        self.notify(
            source,
            StorageChange {
                key: Some(key.to_string()),
            },
        );
        Ok(())
    }

    /// Register a tab and return its id together with its change channel.
    pub(super) fn attach(&self) -> (Uuid, broadcast::Sender<StorageChange>) {
        let id = Uuid::new_v4();
        let (sender, _) = broadcast::channel(*TINY_AUTH_STORAGE_CHANNEL_CAPACITY);
        self.inner.tabs.lock().push(Tab {
            id,
            sender: sender.clone(),
        });
        tracing::debug!("Tab {} attached to local store", id);
        (id, sender)
    }

    pub(super) fn detach(&self, id: Uuid) {
        self.inner.tabs.lock().retain(|tab| tab.id != id);
        tracing::debug!("Tab {} detached from local store", id);
    }

    pub(super) fn tab_count(&self) -> usize {
        self.inner.tabs.lock().len()
    }

    fn notify(&self, source: Option<Uuid>, change: StorageChange) {
        let tabs = self.inner.tabs.lock();
        for tab in tabs.iter().filter(|tab| Some(tab.id) != source) {
            // No receivers just means that tab is not observing yet.
            let _ = tab.sender.send(change.clone());
        }
    }

    /// Write the whole map to the backing file, if any.
    ///
    /// Writes go to a sibling temp file first and are renamed into place, so a
    /// crash never leaves a truncated store behind.
    fn flush(&self, items: &HashMap<String, String>) -> Result<(), StorageError> {
        let Some(path) = &self.inner.path else {
            return Ok(());
        };
        let bytes = serde_json::to_vec_pretty(items)?;
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}

impl Default for LocalStore {
    fn default() -> Self {
        Self::new()
    }
}
