use std::sync::Arc;

use crate::authenticator::{Authenticator, BaseAuthenticator};
use crate::authorizer::{Authorizer, BaseAuthorizer};
use crate::client::RequestPipeline;
use crate::session::main::session::Session;
use crate::storage::{LocalStorage, LocalStore, SessionStorage};

/// Explicit wiring of a [`Session`] to its collaborators.
///
/// Anything left unset falls back to the defaults: a `LocalStorage` tab on a
/// fresh in-memory `LocalStore`, the `BaseAuthenticator` and the
/// `BaseAuthorizer`.
#[derive(Default)]
pub struct SessionBuilder {
    storage: Option<Arc<dyn SessionStorage>>,
    authenticator: Option<Arc<dyn Authenticator>>,
    authorizer: Option<Arc<dyn Authorizer>>,
    pipeline: Option<RequestPipeline>,
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn storage<S: SessionStorage>(mut self, storage: Arc<S>) -> Self {
        self.storage = Some(storage as Arc<dyn SessionStorage>);
        self
    }

    pub fn authenticator<A: Authenticator>(mut self, authenticator: Arc<A>) -> Self {
        self.authenticator = Some(authenticator as Arc<dyn Authenticator>);
        self
    }

    pub fn authorizer<A: Authorizer>(mut self, authorizer: Arc<A>) -> Self {
        self.authorizer = Some(authorizer as Arc<dyn Authorizer>);
        self
    }

    /// Install the session's request hook on `pipeline` when it is built.
    pub fn install_on(mut self, pipeline: &RequestPipeline) -> Self {
        self.pipeline = Some(pipeline.clone());
        self
    }

    /// Construct the session. Its content starts empty; call
    /// [`Session::restore`] (or use [`SessionBuilder::start`]) to hydrate it.
    pub fn build(self) -> Session {
        let storage = self.storage.unwrap_or_else(|| {
            Arc::new(LocalStorage::new(&LocalStore::new())) as Arc<dyn SessionStorage>
        });
        let authenticator = self
            .authenticator
            .unwrap_or_else(|| Arc::new(BaseAuthenticator) as Arc<dyn Authenticator>);
        let authorizer = self
            .authorizer
            .unwrap_or_else(|| Arc::new(BaseAuthorizer) as Arc<dyn Authorizer>);

        let session = Session::from_parts(storage, authenticator, authorizer);
        if let Some(pipeline) = self.pipeline {
            pipeline.install(Arc::new(session.interceptor()));
        }
        session
    }

    /// Build, start observing storage changes and restore from storage: the
    /// usual application start-up sequence. Needs a tokio runtime.
    ///
    /// The subscription is made before the restore, so a write from another
    /// tab in between still reaches the session.
    pub fn start(self) -> Session {
        let session = self.build();
        if !session.observe_storage() {
            session.restore();
        }
        tracing::info!(
            "Session started (authenticated: {})",
            session.is_authenticated()
        );
        session
    }
}
