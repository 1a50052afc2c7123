mod errors;
mod main;
mod types;

pub use errors::SessionError;
pub use main::{Session, SessionBuilder, SessionInterceptor};
pub use types::Transition;
