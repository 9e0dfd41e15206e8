//! Host-facing core for the mediahook extension layer
//!
//! A native streaming-media server calls into this layer synchronously
//! from its own worker threads. The core provides:
//!
//! - [`dispatch`]: the event table mapping each host event to one
//!   handler with a uniform handled/deferred boolean contract
//! - [`invoker`]: one-shot decision invokers for deferred yes/no
//!   answers (publish/play auth, RTSP auth, HTTP access)
//! - [`muxer`]: the per-stream muxer proxy shadowing the host's
//!   output pipeline lifecycle
//! - [`logging`]: the facade that forwards log lines into the host's
//!   structured channel (or stderr when none is installed)
//! - [`handles`]: duck-typed traits over the host's opaque media
//!   objects
//!
//! Everything here executes on the calling host thread; the only
//! component with its own thread of control is the async bridge in the
//! `mediahook-bridge` crate.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod handles;
pub mod invoker;
pub mod logging;
pub mod muxer;
pub mod util;

pub use config::{ConfigStore, MemoryConfig};
pub use dispatch::{Dispatcher, EventHandler};
pub use error::{Error, Result};
pub use events::{FlowReport, MediaInfo, RecordInfo};
pub use handles::{Frame, HttpRequestView, MediaSource, Muxer, SockInfo, Track, TrackType};
pub use invoker::{
    AccessReply, AuthReply, CloseInvoker, DecisionInvoker, HttpAccessInvoker, PlayInvoker,
    PublishInvoker, PublishReply, RealmInvoker, RtspAuthInvoker, RtspCredential,
};
pub use logging::{LogLevel, LogSink, StderrSink};
pub use muxer::{MuxerProxy, MuxerSink};
