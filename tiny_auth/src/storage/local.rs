use tokio::sync::broadcast;
use uuid::Uuid;

use crate::content::SessionContent;
use crate::storage::config::TINY_AUTH_STORAGE_KEY;
use crate::storage::errors::StorageError;
use crate::storage::local_store::LocalStore;
use crate::storage::types::{SessionStorage, StorageChange};

/// Reference storage backend: one JSON blob under one key of a [`LocalStore`].
///
/// Each `LocalStorage` is one tab. It is told about every change another tab
/// (or an external actor) makes to the shared store, whichever key changed.
pub struct LocalStorage {
    store: LocalStore,
    key: String,
    tab_id: Uuid,
    changes: broadcast::Sender<StorageChange>,
}

impl LocalStorage {
    pub fn new(store: &LocalStore) -> Self {
        Self::with_key(store, TINY_AUTH_STORAGE_KEY.as_str())
    }

    pub fn with_key(store: &LocalStore, key: impl Into<String>) -> Self {
        let (tab_id, changes) = store.attach();
        Self {
            store: store.clone(),
            key: key.into(),
            tab_id,
            changes,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn tab_id(&self) -> Uuid {
        self.tab_id
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }
}

impl SessionStorage for LocalStorage {
    fn persist(&self, data: &SessionContent) -> Result<(), StorageError> {
        let value = serde_json::to_string(data)?;
        self.store.set_item_from(Some(self.tab_id), &self.key, &value)
    }

    fn restore(&self) -> Result<Option<SessionContent>, StorageError> {
        let Some(raw) = self.store.get_item(&self.key) else {
            return Ok(None);
        };
        // A stored `null` reads back as nothing persisted.
        let content: Option<SessionContent> = serde_json::from_str(&raw)?;
        Ok(content)
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.store.remove_item_from(Some(self.tab_id), &self.key)
    }

    fn changes(&self) -> Option<broadcast::Receiver<StorageChange>> {
        Some(self.changes.subscribe())
    }
}

impl Drop for LocalStorage {
    fn drop(&mut self) {
        self.store.detach(self.tab_id);
    }
}
