use http::{HeaderMap, StatusCode};

use crate::authorizer::OutgoingRequest;
use crate::client::RequestInterceptor;
use crate::session::main::session::WeakSession;

/// Request hook connecting a session's authorizer to the host pipeline.
///
/// Same-origin requests are handed to `Authorizer::authorize` with a snapshot
/// of the current content; same-origin responses go to
/// `Authorizer::observe_response`. Cross-origin traffic is never touched, and
/// once the session is destroyed or dropped the hook does nothing.
pub struct SessionInterceptor {
    session: WeakSession,
}

impl SessionInterceptor {
    pub(super) fn new(session: WeakSession) -> Self {
        Self { session }
    }
}

impl RequestInterceptor for SessionInterceptor {
    fn before_send(&self, request: &mut OutgoingRequest) {
        if request.is_cross_origin() {
            tracing::trace!("Not authorizing cross-origin request to {}", request.url());
            return;
        }
        let Some(session) = self.session.upgrade() else {
            return;
        };
        if session.is_destroyed() {
            return;
        }

        // Authorize outside the session lock; concurrent requests each get
        // their own snapshot.
        let content = session.content();
        session.authorizer.authorize(request, &content);
    }

    fn after_receive(&self, request: &OutgoingRequest, status: StatusCode, headers: &HeaderMap) {
        if request.is_cross_origin() {
            return;
        }
        let Some(session) = self.session.upgrade() else {
            return;
        };
        if session.is_destroyed() {
            return;
        }
        session.authorizer.observe_response(request, status, headers);
    }

    fn is_active(&self) -> bool {
        self.session
            .upgrade()
            .is_some_and(|session| !session.is_destroyed())
    }
}
