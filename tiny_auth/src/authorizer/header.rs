use http::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use http::StatusCode;
use parking_lot::Mutex;

use crate::authorizer::request::OutgoingRequest;
use crate::authorizer::types::Authorizer;
use crate::content::SessionContent;

/// Authorizer that copies one content field into a request header.
///
/// With the defaults a session holding `{"token": "abc"}` sends
/// `Authorization: Bearer abc`. When configured with a capture header it also
/// supports header-based login: a successful response carrying that header
/// records `{"token": <value>}` as the captured authorization, which
/// `Session::login` can then adopt without a separate authenticate call.
pub struct HeaderAuthorizer {
    content_key: String,
    header: HeaderName,
    scheme: Option<String>,
    capture_header: Option<HeaderName>,
    captured: Mutex<Option<SessionContent>>,
}

impl HeaderAuthorizer {
    pub fn new() -> Self {
        Self {
            content_key: "token".to_string(),
            header: AUTHORIZATION,
            scheme: Some("Bearer".to_string()),
            capture_header: None,
            captured: Mutex::new(None),
        }
    }

    /// Content field holding the credential. Default: "token".
    pub fn with_content_key(mut self, content_key: impl Into<String>) -> Self {
        self.content_key = content_key.into();
        self
    }

    /// Request header to set and the optional scheme prefix placed before the
    /// value. Default: `Authorization` with scheme `Bearer`.
    pub fn with_header(mut self, header: HeaderName, scheme: Option<&str>) -> Self {
        self.header = header;
        self.scheme = scheme.map(str::to_string);
        self
    }

    /// Capture grants the server sends back in `header`.
    pub fn capturing_from(mut self, header: HeaderName) -> Self {
        self.capture_header = Some(header);
        self
    }

    fn header_value(&self, credential: &str) -> Option<HeaderValue> {
        let value = match &self.scheme {
            Some(scheme) => format!("{scheme} {credential}"),
            None => credential.to_string(),
        };
        HeaderValue::from_str(&value).ok()
    }

    fn strip_scheme<'a>(&self, value: &'a str) -> &'a str {
        let Some(scheme) = &self.scheme else {
            return value;
        };
        match value.split_once(' ') {
            Some((prefix, rest)) if prefix.eq_ignore_ascii_case(scheme) => rest.trim(),
            _ => value,
        }
    }
}

impl Default for HeaderAuthorizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Authorizer for HeaderAuthorizer {
    fn authorize(&self, request: &mut OutgoingRequest, content: &SessionContent) {
        let Some(credential) = content.get_str(&self.content_key) else {
            tracing::trace!("No '{}' in session content, not authorizing", self.content_key);
            return;
        };

        match self.header_value(credential) {
            Some(value) => {
                request.headers_mut().insert(self.header.clone(), value);
            }
            None => {
                // Log the error but don't fail the request
                tracing::error!(
                    "Session field '{}' cannot be used as a header value",
                    self.content_key
                );
            }
        }
    }

    fn captured_authorization(&self) -> Option<SessionContent> {
        self.captured.lock().clone()
    }

    fn clear_captured_authorization(&self) {
        *self.captured.lock() = None;
    }

    fn observe_response(&self, _request: &OutgoingRequest, status: StatusCode, headers: &HeaderMap) {
        let Some(capture_header) = &self.capture_header else {
            return;
        };
        if !status.is_success() {
            return;
        }
        let Some(value) = headers.get(capture_header).and_then(|v| v.to_str().ok()) else {
            return;
        };

        let credential = self.strip_scheme(value);
        if credential.is_empty() {
            return;
        }

        tracing::debug!("Captured authorization from '{}' response header", capture_header);
        let mut captured = SessionContent::new();
        captured.insert(self.content_key.clone(), credential);
        *self.captured.lock() = Some(captured);
    }
}
