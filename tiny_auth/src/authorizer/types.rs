use http::{HeaderMap, StatusCode};

use crate::authorizer::request::OutgoingRequest;
use crate::content::SessionContent;

/// Per-request authorization strategy.
///
/// Every method has a do-nothing default, so the trait on its own already is
/// the "base" authorizer.
pub trait Authorizer: Send + Sync + 'static {
    /// Decorate a same-origin outgoing request (typically by attaching a
    /// header) using the current session content. Must not block.
    fn authorize(&self, _request: &mut OutgoingRequest, _content: &SessionContent) {}

    /// Authorization data harvested passively from traffic, if this
    /// authorizer supports that. `Session::login` builds content from it.
    fn captured_authorization(&self) -> Option<SessionContent> {
        None
    }

    /// Forget any captured authorization. Called when the session is
    /// invalidated.
    fn clear_captured_authorization(&self) {}

    /// Inspect a same-origin response. Implementations that support passive
    /// capture record the server-issued grant here.
    fn observe_response(
        &self,
        _request: &OutgoingRequest,
        _status: StatusCode,
        _headers: &HeaderMap,
    ) {
    }
}

/// Authorizer that leaves requests untouched and never captures anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct BaseAuthorizer;

impl Authorizer for BaseAuthorizer {}
