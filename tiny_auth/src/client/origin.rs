use url::{Origin, Url};

/// Decides which outgoing requests count as same-origin and may therefore be
/// authorized. This is configuration of the host pipeline; the session only
/// reads the resulting cross-origin mark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginPolicy {
    /// Only requests to exactly this origin (scheme, host, port) are trusted.
    SameOrigin(Origin),
    /// Requests to any of these origins are trusted.
    AllowList(Vec<Origin>),
}

impl OriginPolicy {
    /// Same-origin policy for the origin of `app_url`.
    pub fn same_origin(app_url: &Url) -> Self {
        Self::SameOrigin(app_url.origin())
    }

    pub fn allow_list<'a>(urls: impl IntoIterator<Item = &'a Url>) -> Self {
        Self::AllowList(urls.into_iter().map(Url::origin).collect())
    }

    /// Whether a request to `url` stays within the trusted origins.
    ///
    /// Opaque origins (`data:`, `file:`, ...) never match, not even themselves.
    pub fn permits(&self, url: &Url) -> bool {
        let origin = url.origin();
        if !origin.is_tuple() {
            return false;
        }
        match self {
            Self::SameOrigin(trusted) => *trusted == origin,
            Self::AllowList(trusted) => trusted.contains(&origin),
        }
    }
}
