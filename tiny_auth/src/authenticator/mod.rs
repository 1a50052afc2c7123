mod config;
mod errors;
mod remote;
mod types;

pub use errors::AuthenticatorError;
pub use remote::HttpAuthenticator;
pub use types::{Authenticator, BaseAuthenticator, Credentials};
