//! tiny-auth - Client-side authentication session
//!
//! Tracks whether the user is authenticated, delegates credential checks and
//! request authorization to pluggable strategies, and keeps session data in a
//! storage shared by every tab of the application.
//!
//! The [`Session`] owns the current content and drives the transitions
//! (authenticate, login, invalidate, restore). It talks to three collaborators:
//! a [`SessionStorage`], an [`Authenticator`] and an [`Authorizer`]. A
//! [`RouteGuard`] protects navigation targets, and a [`RequestPipeline`] lets
//! the authorizer decorate outgoing same-origin requests.

mod authenticator;
mod authorizer;
mod client;
mod content;
mod guard;
mod session;
mod storage;


pub use content::SessionContent;

pub use session::{Session, SessionBuilder, SessionError, SessionInterceptor, Transition};

pub use authenticator::{
    Authenticator, AuthenticatorError, BaseAuthenticator, Credentials, HttpAuthenticator,
};

pub use authorizer::{Authorizer, BaseAuthorizer, HeaderAuthorizer, OutgoingRequest};

pub use storage::{
    LocalStorage, LocalStore, SessionStorage, StorageChange, StorageError, TINY_AUTH_STORAGE_KEY,
};

pub use client::{AuthorizedClient, ClientError, OriginPolicy, RequestInterceptor, RequestPipeline};

pub use guard::{GuardOutcome, Navigator, RouteGuard, TINY_AUTH_LOGIN_ROUTE};

// Re-exported so implementors of the contracts don't need their own copy
pub use async_trait::async_trait;
