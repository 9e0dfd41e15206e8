//! HTTP request/response model at the host boundary
//!
//! The host hands over a fully parsed request (body pre-read, never
//! chunked) and a one-shot response callback. The application side
//! produces a start frame plus body frames; [`Delivery`] folds those
//! back into the single callback invocation the host expects and
//! guarantees exactly one terminal response per task on every path:
//! success, handler error, handler panic, or a scheduler that never
//! ran the task.

use bytes::{Bytes, BytesMut};
use mediahook_core::handles::HttpRequestView;
use mediahook_core::log_warn;

/// Status line of the synthesized failure response
pub const FAILURE_STATUS: u16 = 500;
/// Body of the synthesized failure response
pub const FAILURE_BODY: &[u8] = b"Internal Server Error";

/// Owned snapshot of one inbound request
///
/// Built on the host thread before hand-off so the scheduler never
/// touches host-owned parser state.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    pub query: String,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl HttpRequest {
    pub fn from_view(view: &dyn HttpRequestView) -> Self {
        Self {
            method: view.method().to_string(),
            path: view.path().to_string(),
            query: view.query().to_string(),
            headers: view.headers(),
            body: Bytes::copy_from_slice(view.body()),
        }
    }
}

/// One message from the application to the host
#[derive(Debug, Clone)]
pub enum ResponseFrame {
    /// Response head; must precede any body frame
    Start {
        status: u16,
        headers: Vec<(String, String)>,
    },
    /// Body chunk; `more: false` terminates the response
    Body { data: Bytes, more: bool },
}

/// Host-supplied response callback
///
/// Invoked exactly once per request with the complete response. `Send`
/// because delivery happens on the scheduler thread while the callback
/// was created on a host worker thread.
pub trait ResponseSender: Send {
    fn send(&mut self, status: u16, headers: Vec<(String, String)>, body: Bytes);
}

impl<F> ResponseSender for F
where
    F: FnMut(u16, Vec<(String, String)>, Bytes) + Send,
{
    fn send(&mut self, status: u16, headers: Vec<(String, String)>, body: Bytes) {
        self(status, headers, body)
    }
}

/// Exactly-once delivery guard around a [`ResponseSender`]
///
/// Accumulates frames until a final body frame arrives, then fires the
/// sender. If the guard is dropped before anything was delivered it
/// sends the fixed failure response instead, so the host request can
/// never hang on a task that errored, panicked, or was cancelled at
/// shutdown.
pub struct Delivery {
    sender: Option<Box<dyn ResponseSender>>,
    status: u16,
    headers: Vec<(String, String)>,
    body: BytesMut,
    started: bool,
}

impl Delivery {
    pub fn new(sender: Box<dyn ResponseSender>) -> Self {
        Self {
            sender: Some(sender),
            // Placeholder; a start frame always precedes delivery.
            status: FAILURE_STATUS,
            headers: Vec::new(),
            body: BytesMut::new(),
            started: false,
        }
    }

    /// Whether the terminal response has been sent
    pub fn delivered(&self) -> bool {
        self.sender.is_none()
    }

    /// Feed one application frame
    pub fn frame(&mut self, frame: ResponseFrame) {
        if self.delivered() {
            log_warn!("response already delivered, frame dropped");
            return;
        }
        match frame {
            ResponseFrame::Start { status, headers } => {
                if self.started {
                    log_warn!("duplicate response start frame ignored");
                    return;
                }
                self.started = true;
                self.status = status;
                self.headers = headers;
            }
            ResponseFrame::Body { data, more } => {
                // A body without a start frame is a handler defect;
                // never forward the partial response to the host.
                if !self.started {
                    log_warn!("body frame before any start frame, replying with failure");
                    self.fail();
                    return;
                }
                self.body.extend_from_slice(&data);
                if !more {
                    self.finish();
                }
            }
        }
    }

    fn finish(&mut self) {
        if let Some(mut sender) = self.sender.take() {
            let headers = std::mem::take(&mut self.headers);
            let body = self.body.split().freeze();
            sender.send(self.status, headers, body);
        }
    }

    /// Deliver the fixed failure response, unless a response already
    /// went out
    pub fn fail(&mut self) {
        if let Some(mut sender) = self.sender.take() {
            sender.send(
                FAILURE_STATUS,
                vec![("Content-Type".to_string(), "text/plain".to_string())],
                Bytes::from_static(FAILURE_BODY),
            );
        }
    }
}

impl Drop for Delivery {
    fn drop(&mut self) {
        if !self.delivered() {
            self.fail();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    type Sent = (u16, Vec<(String, String)>, Bytes);

    fn channel_delivery() -> (Delivery, mpsc::Receiver<Sent>) {
        let (tx, rx) = mpsc::channel::<Sent>();
        let delivery = Delivery::new(Box::new(
            move |status: u16, headers: Vec<(String, String)>, body: Bytes| {
                tx.send((status, headers, body)).unwrap();
            },
        ));
        (delivery, rx)
    }

    #[test]
    fn test_start_then_body_delivers_once() {
        let (mut delivery, rx) = channel_delivery();
        delivery.frame(ResponseFrame::Start {
            status: 200,
            headers: vec![("Content-Type".into(), "application/json".into())],
        });
        delivery.frame(ResponseFrame::Body {
            data: Bytes::from_static(b"{\"code\":0"),
            more: true,
        });
        delivery.frame(ResponseFrame::Body {
            data: Bytes::from_static(b"}"),
            more: false,
        });
        assert!(delivery.delivered());

        let (status, headers, body) = rx.try_recv().unwrap();
        assert_eq!(status, 200);
        assert_eq!(headers[0].1, "application/json");
        assert_eq!(&body[..], b"{\"code\":0}");
        assert!(rx.try_recv().is_err(), "exactly one delivery expected");
    }

    #[test]
    fn test_body_without_start_becomes_the_fixed_failure() {
        let (mut delivery, rx) = channel_delivery();
        delivery.frame(ResponseFrame::Body {
            data: Bytes::from_static(b"partial"),
            more: false,
        });
        assert!(delivery.delivered());

        // The partial body never leaks; the host sees the exact
        // failure payload.
        let (status, headers, body) = rx.try_recv().unwrap();
        assert_eq!(status, FAILURE_STATUS);
        assert_eq!(
            headers,
            vec![("Content-Type".to_string(), "text/plain".to_string())]
        );
        assert_eq!(&body[..], FAILURE_BODY);

        // Late frames after the failure are dropped
        delivery.frame(ResponseFrame::Start {
            status: 200,
            headers: vec![],
        });
        delivery.frame(ResponseFrame::Body {
            data: Bytes::from_static(b"late"),
            more: false,
        });
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_frames_after_delivery_are_dropped() {
        let (mut delivery, rx) = channel_delivery();
        delivery.frame(ResponseFrame::Body {
            data: Bytes::new(),
            more: false,
        });
        delivery.frame(ResponseFrame::Start {
            status: 404,
            headers: vec![],
        });
        delivery.frame(ResponseFrame::Body {
            data: Bytes::from_static(b"late"),
            more: false,
        });
        let _ = rx.try_recv().unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_drop_without_delivery_sends_fixed_failure() {
        let (delivery, rx) = channel_delivery();
        drop(delivery);
        let (status, headers, body) = rx.try_recv().unwrap();
        assert_eq!(status, FAILURE_STATUS);
        assert_eq!(
            headers,
            vec![("Content-Type".to_string(), "text/plain".to_string())]
        );
        assert_eq!(&body[..], FAILURE_BODY);
    }

    #[test]
    fn test_fail_after_delivery_is_a_noop() {
        let (mut delivery, rx) = channel_delivery();
        delivery.frame(ResponseFrame::Start {
            status: 204,
            headers: vec![],
        });
        delivery.frame(ResponseFrame::Body {
            data: Bytes::new(),
            more: false,
        });
        delivery.fail();
        let (status, _, _) = rx.try_recv().unwrap();
        assert_eq!(status, 204);
        assert!(rx.try_recv().is_err());
    }
}
