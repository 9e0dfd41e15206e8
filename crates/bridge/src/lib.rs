//! Cross-thread async bridge for the mediahook extension layer
//!
//! Connects two concurrency models that must not mix: the host media
//! server delivers events synchronously on arbitrarily many worker
//! threads, while the embedded web application runs on a single
//! cooperative scheduler thread owned by [`AsyncBridge`].
//!
//! Flow for one intercepted request:
//!
//! 1. The host calls [`HttpInterceptor::try_handle`] on one of its
//!    worker threads. The route probe answers synchronously; on no
//!    full match the host keeps the request.
//! 2. On a match the request (method, path, headers, complete body) is
//!    snapshotted and queued to the scheduler; the host thread returns
//!    immediately.
//! 3. The scheduler thread runs the application handler. Frames it
//!    emits are folded into the host's one-shot response callback.
//! 4. Any handler error or panic becomes the fixed
//!    `500 text/plain "Internal Server Error"` response. Exactly one
//!    terminal response is delivered per submitted request, on every
//!    path including shutdown.

pub mod app;
pub mod bridge;
pub mod error;
pub mod http;
pub mod intercept;

pub use app::{Application, Responder};
pub use bridge::AsyncBridge;
pub use error::{Error, Result};
pub use http::{Delivery, HttpRequest, ResponseFrame, ResponseSender, FAILURE_BODY, FAILURE_STATUS};
pub use intercept::HttpInterceptor;
