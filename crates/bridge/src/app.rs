//! Embedded application contract
//!
//! The web application maintained alongside this layer is opaque: the
//! bridge only needs a route-match query and a request entry point.
//! Handlers run exclusively on the scheduler thread, so their futures
//! do not need to be `Send` (`#[async_trait(?Send)]`); the application
//! object itself is shared with host threads for route probing and
//! must be `Send + Sync`.

use async_trait::async_trait;
use bytes::Bytes;

use crate::http::{Delivery, HttpRequest, ResponseFrame};

/// Frame writer handed to the application for one request
///
/// `send` is async for both frame kinds: an implementation that could
/// complete immediately and one that must wait collapse into the same
/// awaited code path, so handlers never special-case the delivery
/// mechanism.
pub struct Responder<'a> {
    delivery: &'a mut Delivery,
}

impl<'a> Responder<'a> {
    pub(crate) fn new(delivery: &'a mut Delivery) -> Self {
        Self { delivery }
    }

    /// Send one response frame
    pub async fn send(&mut self, frame: ResponseFrame) {
        self.delivery.frame(frame);
    }

    /// Convenience: a complete single-part response
    pub async fn respond(
        &mut self,
        status: u16,
        headers: Vec<(String, String)>,
        body: impl Into<Bytes>,
    ) {
        self.send(ResponseFrame::Start { status, headers }).await;
        self.send(ResponseFrame::Body {
            data: body.into(),
            more: false,
        })
        .await;
    }
}

/// The embedded web application, as seen by the bridge
#[async_trait(?Send)]
pub trait Application: Send + Sync {
    /// Route probe: does any route fully match `method` + `path`?
    ///
    /// Pure read-only query against the static route table; called on
    /// host worker threads without touching the scheduler. Partial or
    /// prefix matches must return `false`.
    fn route_matches(&self, method: &str, path: &str) -> bool;

    /// Handle one request. The request carries the complete pre-read
    /// body; there is exactly one request event per task.
    ///
    /// Runs on the scheduler thread. An `Err` (or a panic) is caught
    /// by the bridge and translated into the fixed failure response.
    async fn handle(&self, request: HttpRequest, responder: &mut Responder<'_>)
        -> anyhow::Result<()>;
}
