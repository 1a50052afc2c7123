mod config;
mod errors;
mod local;
mod local_store;
mod types;

pub use config::TINY_AUTH_STORAGE_KEY;
pub use errors::StorageError;
pub use local::LocalStorage;
pub use local_store::LocalStore;
pub use types::{SessionStorage, StorageChange};
