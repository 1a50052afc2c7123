use std::sync::LazyLock;

/// Key under which `LocalStorage` keeps the serialized session blob.
/// Default: "auth-data"
pub static TINY_AUTH_STORAGE_KEY: LazyLock<String> = LazyLock::new(|| {
    std::env::var("TINY_AUTH_STORAGE_KEY").unwrap_or_else(|_| "auth-data".to_string())
});

/// Buffer size of each tab's change channel. A lagging receiver only loses
/// duplicate notifications, since every notification triggers a full restore.
pub(super) static TINY_AUTH_STORAGE_CHANNEL_CAPACITY: LazyLock<usize> = LazyLock::new(|| {
    std::env::var("TINY_AUTH_STORAGE_CHANNEL_CAPACITY")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|capacity| *capacity > 0)
        .unwrap_or(16)
});

/// Optional file backing for `LocalStore::from_env`.
pub(super) static TINY_AUTH_LOCAL_STORE_PATH: LazyLock<Option<String>> =
    LazyLock::new(|| std::env::var("TINY_AUTH_LOCAL_STORE_PATH").ok());
