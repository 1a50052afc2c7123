use std::sync::LazyLock;

/// Request timeout for `HttpAuthenticator`, in seconds.
/// Default: 30
pub(super) static TINY_AUTH_HTTP_TIMEOUT_SECS: LazyLock<u64> = LazyLock::new(|| {
    std::env::var("TINY_AUTH_HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(30)
});
