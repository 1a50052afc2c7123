use tokio::sync::broadcast;

use crate::content::SessionContent;
use crate::storage::errors::StorageError;

/// Notification that the persisted value was changed by another actor.
///
/// Only says that *something* changed; the key is for diagnostics. Receivers
/// re-read through `restore()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageChange {
    /// Key that changed, `None` when the whole store was wiped.
    pub key: Option<String>,
}

/// Persistence backend mirroring session content.
///
/// `restore()` must return exactly what was last passed to `persist()`, and
/// `None` when nothing was persisted or after `clear()`.
pub trait SessionStorage: Send + Sync + 'static {
    fn persist(&self, data: &SessionContent) -> Result<(), StorageError>;

    fn restore(&self) -> Result<Option<SessionContent>, StorageError>;

    fn clear(&self) -> Result<(), StorageError>;

    /// Subscribe to changes made by external actors (for example another tab
    /// sharing the same store). Backends without such a signal return `None`.
    fn changes(&self) -> Option<broadcast::Receiver<StorageChange>> {
        None
    }
}
