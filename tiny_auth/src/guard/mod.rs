mod config;
mod route;

pub use config::TINY_AUTH_LOGIN_ROUTE;
pub use route::{GuardOutcome, Navigator, RouteGuard};
