use futures_util::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};

use crate::authenticator::{Authenticator, AuthenticatorError, Credentials};
use crate::authorizer::Authorizer;
use crate::content::SessionContent;
use crate::session::errors::SessionError;
use crate::session::main::builder::SessionBuilder;
use crate::session::main::interceptor::SessionInterceptor;
use crate::session::types::Transition;
use crate::storage::{SessionStorage, StorageError};

type PendingInvalidation = Shared<BoxFuture<'static, Result<(), SessionError>>>;

/// Client-side authentication session.
///
/// Holds the current [`SessionContent`] (empty means unauthenticated) and
/// mirrors every change of it into the configured storage. Credential checks
/// are delegated to the [`Authenticator`], request decoration to the
/// [`Authorizer`].
///
/// `Session` is a cheap handle: clones share the same state. Operations that
/// spawn work (`invalidate`, `observe_storage`) need a tokio runtime.
#[derive(Clone)]
pub struct Session {
    pub(super) inner: Arc<SessionInner>,
}

pub(super) struct SessionInner {
    state: Mutex<SessionState>,
    storage: Arc<dyn SessionStorage>,
    authenticator: Arc<dyn Authenticator>,
    pub(super) authorizer: Arc<dyn Authorizer>,
    // Lock order: `invalidation` before `state`.
    invalidation: Mutex<Option<PendingInvalidation>>,
    observer: Mutex<Option<JoinHandle<()>>>,
    authenticated: watch::Sender<bool>,
    destroyed: AtomicBool,
}

struct SessionState {
    content: SessionContent,
    attempted_transition: Option<Transition>,
}

impl Session {
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    pub(super) fn from_parts(
        storage: Arc<dyn SessionStorage>,
        authenticator: Arc<dyn Authenticator>,
        authorizer: Arc<dyn Authorizer>,
    ) -> Self {
        let (authenticated, _) = watch::channel(false);
        Self {
            inner: Arc::new(SessionInner {
                state: Mutex::new(SessionState {
                    content: SessionContent::new(),
                    attempted_transition: None,
                }),
                storage,
                authenticator,
                authorizer,
                invalidation: Mutex::new(None),
                observer: Mutex::new(None),
                authenticated,
                destroyed: AtomicBool::new(false),
            }),
        }
    }

    /// Snapshot of the current content. Treat it as read-only; use
    /// [`Session::integrate_content`] to add local data.
    pub fn content(&self) -> SessionContent {
        self.inner.state.lock().content.clone()
    }

    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        self.inner.state.lock().content.get(key).cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        !self.inner.state.lock().content.is_empty()
    }

    /// Receiver that always holds the current `is_authenticated` value.
    pub fn watch_authenticated(&self) -> watch::Receiver<bool> {
        self.inner.authenticated.subscribe()
    }

    pub fn attempted_transition(&self) -> Option<Transition> {
        self.inner.state.lock().attempted_transition.clone()
    }

    pub fn set_attempted_transition(&self, transition: Option<Transition>) {
        self.inner.state.lock().attempted_transition = transition;
    }

    pub fn take_attempted_transition(&self) -> Option<Transition> {
        self.inner.state.lock().attempted_transition.take()
    }

    /// Authenticate with the configured authenticator.
    ///
    /// On success the resolved data becomes the session content (and is
    /// persisted) and is also returned. On failure the content is untouched.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<SessionContent, SessionError> {
        let content = self
            .inner
            .authenticator
            .authenticate(credentials)
            .await
            .map_err(|e| SessionError::from_authentication(e).log())?;

        self.inner
            .replace_content(content.clone())
            .map_err(|e| SessionError::from(e).log())?;

        tracing::debug!("Session authenticated with {} content fields", content.len());
        Ok(content)
    }

    /// Log in with the authorization the authorizer captured from traffic.
    ///
    /// The new content is the captured authorization with `data` layered on
    /// top (`data` wins on conflicting keys). Fails with `IllegalState` when
    /// nothing has been captured.
    pub fn login(&self, data: SessionContent) -> Result<(), SessionError> {
        let Some(captured) = self.inner.authorizer.captured_authorization() else {
            return Err(SessionError::IllegalState(
                "Authorization information not captured by authorizer".to_string(),
            )
            .log());
        };

        self.inner
            .replace_content(captured.merged_with(&data))
            .map_err(|e| SessionError::from(e).log())?;

        tracing::debug!("Session logged in from captured authorization");
        Ok(())
    }

    /// Invalidate the session.
    ///
    /// Local content, the authorizer's captured authorization and storage are
    /// cleared whether or not the authenticator's remote invalidation
    /// succeeds; a remote failure is reported afterwards as
    /// `InvalidationFailed`. Calls made while an invalidation is in flight
    /// join it and observe the same outcome.
    pub async fn invalidate(&self) -> Result<(), SessionError> {
        let pending = {
            let mut slot = self.inner.invalidation.lock();
            match slot.as_ref() {
                Some(pending) => {
                    tracing::debug!("Invalidation already in flight, joining it");
                    pending.clone()
                }
                None => {
                    let pending = SessionInner::start_invalidation(Arc::clone(&self.inner));
                    *slot = Some(pending.clone());
                    pending
                }
            }
        };
        pending.await
    }

    /// Merge `partial` into the content without overwriting existing keys.
    ///
    /// Ignored while unauthenticated.
    pub fn integrate_content(&self, partial: SessionContent) -> Result<(), SessionError> {
        let mut state = self.inner.state.lock();
        if state.content.is_empty() {
            tracing::debug!("Not authenticated, ignoring content integration");
            return Ok(());
        }

        let merged = partial.merged_with(&state.content);
        self.inner
            .commit(&mut state, merged)
            .map_err(|e| SessionError::from(e).log())
    }

    /// Reload the content from storage. Never fails: nothing persisted, or
    /// unreadable storage, leaves the session unauthenticated.
    pub fn restore(&self) {
        self.inner.restore();
    }

    /// Restore automatically whenever storage reports an external change.
    ///
    /// Subscribes at most once; returns whether this call created the
    /// subscription. A new subscription is followed by one `restore()`, so
    /// writes made before it existed are not missed.
    pub fn observe_storage(&self) -> bool {
        let mut observer = self.inner.observer.lock();
        if observer.as_ref().is_some_and(|task| !task.is_finished()) {
            return false;
        }

        let Some(mut changes) = self.inner.storage.changes() else {
            tracing::debug!("Storage does not report external changes");
            return false;
        };

        let session = Arc::downgrade(&self.inner);
        *observer = Some(tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(change) => tracing::debug!("Storage changed: {:?}", change.key),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!("Coalesced {} storage notifications", skipped)
                    }
                    Err(RecvError::Closed) => break,
                }
                let Some(inner) = session.upgrade() else {
                    break;
                };
                if inner.is_destroyed() {
                    break;
                }
                inner.restore();
            }
            tracing::debug!("Stopped observing storage");
        }));
        drop(observer);

        // Subscribed first: anything written from here on is queued for the task.
        self.inner.restore();
        true
    }

    /// Hook to install on the host request pipeline. It holds only a weak
    /// reference: once the session is gone it stops doing anything.
    pub fn interceptor(&self) -> SessionInterceptor {
        SessionInterceptor::new(Arc::downgrade(&self.inner))
    }

    /// Tear the session down: the request hook becomes a no-op and storage
    /// is no longer observed. Content is left as it is.
    pub fn destroy(&self) {
        self.inner.destroyed.store(true, Ordering::Release);
        if let Some(task) = self.inner.observer.lock().take() {
            task.abort();
        }
        tracing::debug!("Session destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.is_destroyed()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}

impl SessionInner {
    pub(super) fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }

    pub(super) fn content(&self) -> SessionContent {
        self.state.lock().content.clone()
    }

    fn replace_content(&self, content: SessionContent) -> Result<(), StorageError> {
        let mut state = self.state.lock();
        self.commit(&mut state, content)
    }

    /// The "content replaced" step: persist, then swap, inside the caller's
    /// critical section. If persisting fails the content is left as it was.
    fn commit(&self, state: &mut SessionState, content: SessionContent) -> Result<(), StorageError> {
        self.storage.persist(&content)?;
        state.content = content;
        self.authenticated.send_replace(!state.content.is_empty());
        Ok(())
    }

    fn restore(&self) {
        let mut state = self.state.lock();
        let restored = match self.storage.restore() {
            Ok(content) => content.unwrap_or_default(),
            Err(e @ StorageError::Serde(_)) => {
                tracing::warn!("Discarding unreadable session content: {}", e);
                if let Err(e) = self.storage.clear() {
                    tracing::warn!("Could not remove unreadable session content: {}", e);
                }
                SessionContent::new()
            }
            Err(e) => {
                tracing::warn!("Could not restore session content, treating as unauthenticated: {}", e);
                SessionContent::new()
            }
        };
        // Storage already holds this value, so it is not written back.
        state.content = restored;
        self.authenticated.send_replace(!state.content.is_empty());
        tracing::debug!(
            "Session restored (authenticated: {})",
            !state.content.is_empty()
        );
    }

    fn start_invalidation(inner: Arc<SessionInner>) -> PendingInvalidation {
        let content = inner.content();
        // Weak: the pending future sits in the session's own slot.
        let recovery = Arc::downgrade(&inner);

        // Detached so that cleanup completes even if every caller stops polling.
        let task = tokio::spawn(async move {
            let remote = AssertUnwindSafe(inner.authenticator.invalidate(&content))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| {
                    Err(AuthenticatorError::Rejected(
                        "authenticator panicked during invalidation".to_string(),
                    ))
                });
            inner.finish_invalidation(remote)
        });

        async move {
            match task.await {
                Ok(result) => result,
                Err(e) => match recovery.upgrade() {
                    Some(inner) => inner.recover_invalidation(e),
                    None => Err(SessionError::IllegalState(format!(
                        "invalidation did not complete: {e}"
                    ))),
                },
            }
        }
        .boxed()
        .shared()
    }

    fn finish_invalidation(
        &self,
        remote: Result<(), AuthenticatorError>,
    ) -> Result<(), SessionError> {
        let mut slot = self.invalidation.lock();
        let cleared = self.clear_local();
        *slot = None;
        drop(slot);

        tracing::debug!("Session invalidated");
        match (remote, cleared) {
            (Err(e), cleared) => {
                if let Err(storage_err) = cleared {
                    tracing::error!("Storage could not be cleared: {}", storage_err);
                }
                Err(SessionError::InvalidationFailed(e).log())
            }
            (Ok(()), Err(e)) => Err(SessionError::Storage(e).log()),
            (Ok(()), Ok(())) => Ok(()),
        }
    }

    fn clear_local(&self) -> Result<(), StorageError> {
        let mut state = self.state.lock();
        state.content = SessionContent::new();
        self.authenticated.send_replace(false);
        self.authorizer.clear_captured_authorization();
        self.storage.clear()
    }

    /// The invalidation task was cancelled or panicked before finishing:
    /// retry the local cleanup and free the slot so later calls start over.
    fn recover_invalidation(&self, err: JoinError) -> Result<(), SessionError> {
        tracing::error!("Invalidation task did not complete: {}", err);

        let mut slot = self.invalidation.lock();
        let cleared = std::panic::catch_unwind(AssertUnwindSafe(|| self.clear_local()));
        *slot = None;
        drop(slot);

        match cleared {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!("Storage could not be cleared: {}", e),
            Err(_) => tracing::error!("Local cleanup panicked during invalidation recovery"),
        }
        Err(SessionError::IllegalState(format!("invalidation did not complete: {err}")).log())
    }
}

impl Drop for SessionInner {
    fn drop(&mut self) {
        if let Some(task) = self.observer.get_mut().take() {
            task.abort();
        }
    }
}

pub(super) type WeakSession = Weak<SessionInner>;
