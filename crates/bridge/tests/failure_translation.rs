//! Failure translation properties
//!
//! Whatever goes wrong inside an application handler, the host sees
//! the fixed `500 text/plain "Internal Server Error"` response and a
//! warn-level log line, never an unwinding stack and never a hung
//! request.

use std::sync::mpsc;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use anyhow::bail;
use bytes::Bytes;
use mediahook_bridge::{
    Application, AsyncBridge, HttpRequest, Responder, ResponseFrame, ResponseSender, FAILURE_BODY,
    FAILURE_STATUS,
};
use mediahook_core::logging::{install_sink, LogLevel, LogSink};

struct Recorder {
    entries: Mutex<Vec<(LogLevel, String)>>,
}

impl Recorder {
    fn matching(&self, needle: &str) -> Vec<(LogLevel, String)> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, m)| m.contains(needle))
            .cloned()
            .collect()
    }
}

struct RecordingSink(&'static Recorder);

impl LogSink for RecordingSink {
    fn log(&self, level: LogLevel, _file: &str, _line: u32, _func: &str, message: &str) {
        self.0
            .entries
            .lock()
            .unwrap()
            .push((level, message.to_string()));
    }
}

fn recorder() -> &'static Recorder {
    static RECORDER: OnceLock<Recorder> = OnceLock::new();
    let rec = RECORDER.get_or_init(|| Recorder {
        entries: Mutex::new(Vec::new()),
    });
    let _ = install_sink(Box::new(RecordingSink(rec)));
    rec
}

/// Routes everything; failure mode depends on the path
struct FaultyApp;

#[async_trait::async_trait(?Send)]
impl Application for FaultyApp {
    fn route_matches(&self, _method: &str, _path: &str) -> bool {
        true
    }

    async fn handle(
        &self,
        request: HttpRequest,
        responder: &mut Responder<'_>,
    ) -> anyhow::Result<()> {
        match request.path.as_str() {
            "/error" => bail!("handler-error-probe"),
            "/panic" => panic!("kaboom-panic-probe"),
            "/incomplete" => {
                // Start frame but no terminal body frame
                responder
                    .send(ResponseFrame::Start {
                        status: 200,
                        headers: vec![],
                    })
                    .await;
                Ok(())
            }
            _ => {
                responder.respond(200, vec![], Bytes::from_static(b"ok")).await;
                Ok(())
            }
        }
    }
}

fn submit(bridge: &AsyncBridge, path: &str) -> (u16, Vec<(String, String)>, Bytes) {
    let (tx, rx) = mpsc::channel();
    let sender: Box<dyn ResponseSender> = Box::new(
        move |status: u16, headers: Vec<(String, String)>, body: Bytes| {
            let _ = tx.send((status, headers, body));
        },
    );
    bridge
        .submit(
            HttpRequest {
                method: "GET".into(),
                path: path.into(),
                query: String::new(),
                headers: vec![],
                body: Bytes::new(),
            },
            sender,
        )
        .unwrap();
    rx.recv_timeout(Duration::from_secs(10)).unwrap()
}

fn assert_fixed_failure(response: &(u16, Vec<(String, String)>, Bytes)) {
    let (status, headers, body) = response;
    assert_eq!(*status, FAILURE_STATUS);
    assert_eq!(
        headers.as_slice(),
        &[("Content-Type".to_string(), "text/plain".to_string())]
    );
    assert_eq!(&body[..], FAILURE_BODY);
}

#[test]
fn handler_error_becomes_the_fixed_500_with_one_warn_line() {
    let rec = recorder();
    let bridge = AsyncBridge::start(Arc::new(FaultyApp)).unwrap();

    let response = submit(&bridge, "/error");
    assert_fixed_failure(&response);

    let entries = rec.matching("handler-error-probe");
    assert_eq!(entries.len(), 1, "exactly one log line mentioning the error");
    assert_eq!(entries[0].0, LogLevel::Warn);
}

#[test]
fn handler_panic_becomes_the_fixed_500_with_one_warn_line() {
    let rec = recorder();
    let bridge = AsyncBridge::start(Arc::new(FaultyApp)).unwrap();

    let response = submit(&bridge, "/panic");
    assert_fixed_failure(&response);

    let entries = rec.matching("kaboom-panic-probe");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0, LogLevel::Warn);

    // The scheduler survives the panic
    let (status, _, body) = submit(&bridge, "/ok");
    assert_eq!(status, 200);
    assert_eq!(&body[..], b"ok");
}

#[test]
fn incomplete_response_is_closed_out_with_the_fixed_500() {
    let rec = recorder();
    let bridge = AsyncBridge::start(Arc::new(FaultyApp)).unwrap();

    let response = submit(&bridge, "/incomplete");
    assert_fixed_failure(&response);

    let entries = rec.matching("/incomplete without completing");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0, LogLevel::Warn);
}
