//! Per-stream muxer proxy
//!
//! When the host opens an output muxer it may ask this layer for a
//! delegate that sees every track/frame of that stream. The host
//! serializes all calls for one muxer on the thread driving that
//! stream, so the proxy needs no internal locking and holds no
//! cross-instance state.
//!
//! Lifecycle per instance:
//! `Negotiating -(add_track*)-> add_track_completed -> Ready
//! -(input_frame*)-> destroy`. Out-of-order host calls are logged and
//! rejected instead of reaching the sink.

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::handles::{Frame, Track};
use crate::util::panic_message;
use crate::{log_error, log_warn};

/// Delegate installed for one output stream
///
/// `add_track` / `input_frame` return `true` to accept the track or
/// frame; returning `false` from `input_frame` tells the host this
/// layer consumed (suppressed) the frame.
pub trait MuxerSink: Send {
    fn add_track(&mut self, track: &dyn Track) -> bool;

    /// Marks track negotiation closed; no return value
    fn add_track_completed(&mut self);

    fn input_frame(&mut self, frame: &dyn Frame) -> bool;

    /// Release anything the sink holds. The host muxer handle is not
    /// owned here and must not be touched afterwards.
    fn destroy(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MuxerState {
    Negotiating,
    Ready,
    Destroyed,
}

/// Stateful wrapper enforcing the muxer call order around a
/// [`MuxerSink`]
///
/// Sink panics are contained here; they are logged and treated as a
/// rejected call, never unwound into the host pipeline.
pub struct MuxerProxy {
    sink: Box<dyn MuxerSink>,
    state: MuxerState,
}

impl MuxerProxy {
    pub fn new(sink: Box<dyn MuxerSink>) -> Self {
        Self {
            sink,
            state: MuxerState::Negotiating,
        }
    }

    pub fn add_track(&mut self, track: &dyn Track) -> bool {
        if self.state != MuxerState::Negotiating {
            log_warn!("add_track after negotiation completed, track rejected");
            return false;
        }
        self.guard_bool("add_track", |sink| sink.add_track(track))
    }

    pub fn add_track_completed(&mut self) {
        if self.state != MuxerState::Negotiating {
            log_warn!("add_track_completed outside negotiation, ignored");
            return;
        }
        self.state = MuxerState::Ready;
        let sink = &mut self.sink;
        if let Err(panic) = catch_unwind(AssertUnwindSafe(|| sink.add_track_completed())) {
            log_error!("muxer sink panicked in add_track_completed: {}", panic_message(&panic));
        }
    }

    pub fn input_frame(&mut self, frame: &dyn Frame) -> bool {
        if self.state != MuxerState::Ready {
            log_warn!("input_frame outside the ready state, frame rejected");
            return false;
        }
        self.guard_bool("input_frame", |sink| sink.input_frame(frame))
    }

    /// Host-driven teardown. At most one effective call; later calls
    /// (and the implicit one from `Drop`) are no-ops.
    pub fn destroy(&mut self) {
        if self.state == MuxerState::Destroyed {
            return;
        }
        self.state = MuxerState::Destroyed;
        let sink = &mut self.sink;
        if let Err(panic) = catch_unwind(AssertUnwindSafe(|| sink.destroy())) {
            log_error!("muxer sink panicked in destroy: {}", panic_message(&panic));
        }
    }

    fn guard_bool(&mut self, op: &str, f: impl FnOnce(&mut Box<dyn MuxerSink>) -> bool) -> bool {
        match catch_unwind(AssertUnwindSafe(|| f(&mut self.sink))) {
            Ok(accepted) => accepted,
            Err(panic) => {
                log_error!("muxer sink panicked in {}: {}", op, panic_message(&panic));
                false
            }
        }
    }
}

impl Drop for MuxerProxy {
    // Mirrors the host-side delegate contract: the sink always sees a
    // destroy, even when the host drops the proxy without calling it.
    fn drop(&mut self) {
        self.destroy();
    }
}
