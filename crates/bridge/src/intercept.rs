//! Host-side request interception
//!
//! The object registered once at process start as the host's
//! designated bridge for application requests. For every inbound
//! request the host asks [`HttpInterceptor::try_handle`]; the route
//! probe runs synchronously on the calling host thread and only a full
//! match pays the cost of a thread hand-off.

use std::sync::Arc;

use mediahook_core::handles::HttpRequestView;
use mediahook_core::log_error;

use crate::bridge::AsyncBridge;
use crate::http::{HttpRequest, ResponseSender};

/// Route-probe + submission pair installed with the host
pub struct HttpInterceptor {
    bridge: Arc<AsyncBridge>,
}

impl HttpInterceptor {
    pub fn new(bridge: Arc<AsyncBridge>) -> Self {
        Self { bridge }
    }

    /// Intercept one inbound request
    ///
    /// Returns `false` when no application route fully matches; the
    /// sender is left untouched and the host applies its default
    /// handling. Returns `true` when the request was consumed; the
    /// response (possibly the fixed failure response, if the scheduler
    /// is gone) arrives through `sender` exactly once.
    pub fn try_handle(&self, request: &dyn HttpRequestView, sender: Box<dyn ResponseSender>) -> bool {
        if !self.bridge.route_matches(request.method(), request.path()) {
            return false;
        }

        let snapshot = HttpRequest::from_view(request);
        if let Err(err) = self.bridge.submit(snapshot, sender) {
            // The task already answered through its own sender; this
            // line is the operator-visible trace of the lost request.
            log_error!(
                "intercepted {} {} but the scheduler is unavailable: {}",
                request.method(),
                request.path(),
                err
            );
        }
        true
    }
}
