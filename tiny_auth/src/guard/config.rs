use std::sync::LazyLock;

/// Destination unauthenticated navigation is sent to.
/// Default: "login"
pub static TINY_AUTH_LOGIN_ROUTE: LazyLock<String> = LazyLock::new(|| {
    std::env::var("TINY_AUTH_LOGIN_ROUTE").unwrap_or_else(|_| "login".to_string())
});
