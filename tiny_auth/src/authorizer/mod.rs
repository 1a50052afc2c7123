mod header;
mod request;
mod types;

pub use header::HeaderAuthorizer;
pub use request::OutgoingRequest;
pub use types::{Authorizer, BaseAuthorizer};
