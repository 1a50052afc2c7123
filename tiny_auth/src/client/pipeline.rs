use http::{HeaderMap, StatusCode};
use parking_lot::RwLock;
use std::sync::Arc;

use crate::authorizer::OutgoingRequest;
use crate::client::origin::OriginPolicy;

/// Hook run by the host for every outgoing request and its response.
pub trait RequestInterceptor: Send + Sync + 'static {
    /// Called synchronously before the request is dispatched.
    fn before_send(&self, request: &mut OutgoingRequest);

    /// Called once the response head is available.
    fn after_receive(&self, _request: &OutgoingRequest, _status: StatusCode, _headers: &HeaderMap) {
    }

    /// Whether the interceptor still has anything to do. Inactive ones are
    /// dropped from the pipeline on the next `install`.
    fn is_active(&self) -> bool {
        true
    }
}

/// The host application's outgoing-request hook registry.
///
/// Cloning shares the registry. Interceptors run in installation order, after
/// the origin policy has marked the request as same- or cross-origin.
#[derive(Clone)]
pub struct RequestPipeline {
    policy: OriginPolicy,
    interceptors: Arc<RwLock<Vec<Arc<dyn RequestInterceptor>>>>,
}

impl RequestPipeline {
    pub fn new(policy: OriginPolicy) -> Self {
        Self {
            policy,
            interceptors: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn policy(&self) -> &OriginPolicy {
        &self.policy
    }

    pub fn install(&self, interceptor: Arc<dyn RequestInterceptor>) {
        let mut interceptors = self.interceptors.write();
        let before = interceptors.len();
        interceptors.retain(|installed| installed.is_active());
        let pruned = before - interceptors.len();
        interceptors.push(interceptor);
        tracing::debug!(
            "Request interceptor installed ({} inactive pruned)",
            pruned
        );
    }

    pub fn len(&self) -> usize {
        self.interceptors.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.read().is_empty()
    }

    /// Classify the request and run every interceptor's `before_send`.
    pub fn prepare(&self, request: &mut OutgoingRequest) {
        request.set_cross_origin(!self.policy.permits(request.url()));
        for interceptor in self.snapshot() {
            interceptor.before_send(request);
        }
    }

    /// Run every interceptor's `after_receive`.
    pub fn complete(&self, request: &OutgoingRequest, status: StatusCode, headers: &HeaderMap) {
        for interceptor in self.snapshot() {
            interceptor.after_receive(request, status, headers);
        }
    }

    // Interceptors may install further interceptors; never call them under the lock.
    fn snapshot(&self) -> Vec<Arc<dyn RequestInterceptor>> {
        self.interceptors.read().clone()
    }
}
