//! Cross-thread async bridge
//!
//! Exactly one cooperative scheduler thread per bridge. Host worker
//! threads submit tasks through a multi-producer channel and return
//! immediately; the scheduler thread runs a current-thread tokio
//! runtime with a `LocalSet` and executes every application handler
//! there. No application code ever runs on a host thread, and no
//! failure on the scheduler thread ever reaches one.
//!
//! Task lifecycle: submitted on a host thread, spawned onto the local
//! set, finished with exactly one terminal response. The [`Delivery`]
//! guard enforces the terminal response on the failure paths (handler
//! error, handler panic, task cancelled by shutdown, submission after
//! shutdown).

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::thread::JoinHandle;

use futures::FutureExt;
use mediahook_core::log_warn;
use mediahook_core::util::panic_message;
use tokio::sync::mpsc;
use tokio::task::LocalSet;

use crate::app::{Application, Responder};
use crate::http::{Delivery, HttpRequest, ResponseSender};
use crate::{Error, Result};

struct Task {
    request: HttpRequest,
    delivery: Delivery,
}

/// Owner of the scheduler thread
///
/// Construct once at process start with [`AsyncBridge::start`]; inject
/// wherever dispatch needs it. Dropping the bridge (or calling
/// [`shutdown`](AsyncBridge::shutdown)) closes the queue and joins the
/// thread; tasks that never finished are answered with the fixed
/// failure response by their delivery guards, never silently dropped.
pub struct AsyncBridge {
    app: Arc<dyn Application>,
    task_tx: Option<mpsc::UnboundedSender<Task>>,
    thread: Option<JoinHandle<()>>,
}

impl AsyncBridge {
    /// Build the runtime and spawn the scheduler thread
    ///
    /// A startup failure here is fatal to the whole bridge; callers
    /// must not register with the host when this errors.
    pub fn start(app: Arc<dyn Application>) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let (task_tx, task_rx) = mpsc::unbounded_channel();
        let worker_app = app.clone();
        let thread = std::thread::Builder::new()
            .name("mediahook-scheduler".into())
            .spawn(move || scheduler_main(runtime, worker_app, task_rx))?;

        tracing::info!("scheduler thread started");
        Ok(Self {
            app,
            task_tx: Some(task_tx),
            thread: Some(thread),
        })
    }

    /// Route probe; synchronous, safe from any host thread
    pub fn route_matches(&self, method: &str, path: &str) -> bool {
        self.app.route_matches(method, path)
    }

    /// Hand one request to the scheduler; fire-and-forget
    ///
    /// Returns as soon as the task is queued. On a stopped scheduler
    /// the task is answered with the fixed failure response through
    /// its own sender and `Error::Closed` is returned, so the
    /// host-side request terminates either way.
    pub fn submit(&self, request: HttpRequest, sender: Box<dyn ResponseSender>) -> Result<()> {
        let delivery = Delivery::new(sender);
        let Some(task_tx) = self.task_tx.as_ref() else {
            drop(delivery);
            return Err(Error::Closed);
        };
        tracing::trace!(method = %request.method, path = %request.path, "submitting task");
        task_tx
            .send(Task { request, delivery })
            .map_err(|mpsc::error::SendError(task)| {
                drop(task);
                Error::Closed
            })
    }

    /// Stop the scheduler and join its thread
    ///
    /// Closes the queue; the scheduler drains whatever is already
    /// queued, and any task still unfinished when the loop ends is
    /// cancelled. Its delivery guard sends the failure response.
    pub fn shutdown(&mut self) {
        self.task_tx = None;
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::error!("scheduler thread panicked during shutdown");
            } else {
                tracing::info!("scheduler thread stopped");
            }
        }
    }
}

impl Drop for AsyncBridge {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn scheduler_main(
    runtime: tokio::runtime::Runtime,
    app: Arc<dyn Application>,
    mut task_rx: mpsc::UnboundedReceiver<Task>,
) {
    let local = LocalSet::new();
    local.block_on(&runtime, async move {
        while let Some(task) = task_rx.recv().await {
            tokio::task::spawn_local(run_task(app.clone(), task));
        }
    });
    // Unfinished spawned tasks are dropped with the local set here;
    // their delivery guards fire the failure response.
    tracing::debug!("scheduler queue closed");
}

async fn run_task(app: Arc<dyn Application>, task: Task) {
    let Task {
        request,
        mut delivery,
    } = task;
    let method = request.method.clone();
    let path = request.path.clone();

    let outcome = AssertUnwindSafe(async {
        let mut responder = Responder::new(&mut delivery);
        app.handle(request, &mut responder).await
    })
    .catch_unwind()
    .await;

    match outcome {
        Ok(Ok(())) => {
            if !delivery.delivered() {
                log_warn!(
                    "handler finished {} {} without completing the response",
                    method,
                    path
                );
                delivery.fail();
            }
        }
        Ok(Err(err)) => {
            log_warn!("request handler failed for {} {}: {:#}", method, path, err);
            delivery.fail();
        }
        Err(panic) => {
            log_warn!(
                "request handler panicked for {} {}: {}",
                method,
                path,
                panic_message(&panic)
            );
            delivery.fail();
        }
    }
}
