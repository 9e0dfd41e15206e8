//! Host event dispatch table
//!
//! One handler method per host event, all invoked synchronously on
//! whatever worker thread the host delivers the event from. The return
//! value contract is uniform: `true` means this layer fully handled
//! the event and the host must skip its default behavior, `false`
//! defers to the host.
//!
//! [`EventHandler`] mirrors the extension module surface: every method
//! has a default body returning `false` (or doing nothing), so an
//! implementation only overrides the events it cares about.
//! [`Dispatcher`] is the host-facing wrapper that guarantees no panic
//! ever unwinds into a host call frame.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use crate::events::{FlowReport, MediaInfo, RecordInfo};
use crate::handles::{HttpRequestView, MediaSource, Muxer, SockInfo};
use crate::invoker::{
    CloseInvoker, HttpAccessInvoker, PlayInvoker, PublishInvoker, RealmInvoker, RtspAuthInvoker,
};
use crate::log_error;
use crate::muxer::{MuxerProxy, MuxerSink};
use crate::util::panic_message;

/// Extension event surface
///
/// Handlers must not block on I/O or on the scheduler thread. Visible
/// side effects are limited to logging, resolving the passed invoker,
/// explicit host operations on the passed handles, and delegating work
/// to the async bridge.
#[allow(unused_variables)]
pub trait EventHandler: Send + Sync {
    /// Process start; runs before any other event
    fn on_start(&self) {}

    /// Process exit; must release everything this layer owns
    fn on_exit(&self) {}

    /// Publish auth. `origin` is the ingress type string (`rtmp_push`,
    /// `rtsp_push`, ...).
    fn on_publish(
        &self,
        origin: &str,
        info: &MediaInfo,
        invoker: PublishInvoker,
        sender: &dyn SockInfo,
    ) -> bool {
        false
    }

    /// Play auth
    fn on_play(&self, info: &MediaInfo, invoker: PlayInvoker, sender: &dyn SockInfo) -> bool {
        false
    }

    /// Session traffic stats, observability only
    fn on_flow_report(&self, info: &MediaInfo, report: &FlowReport, sender: &dyn SockInfo) -> bool {
        false
    }

    /// A media source registered (`registered == true`) or went away.
    /// The handle must not be retained past this call.
    fn on_media_changed(&self, registered: bool, source: &dyn MediaSource) -> bool {
        false
    }

    /// A pull proxy gave up on its upstream
    fn on_player_proxy_failed(&self, url: &str, media: &MediaInfo, error: &str) -> bool {
        false
    }

    /// RTSP realm lookup; resolving with a non-empty realm enables
    /// RTSP auth for the stream
    fn on_get_rtsp_realm(
        &self,
        info: &MediaInfo,
        invoker: RealmInvoker,
        sender: &dyn SockInfo,
    ) -> bool {
        false
    }

    /// RTSP credential lookup for `user_name` under `realm`
    fn on_rtsp_auth(
        &self,
        info: &MediaInfo,
        realm: &str,
        user_name: &str,
        must_no_encrypt: bool,
        invoker: RtspAuthInvoker,
        sender: &dyn SockInfo,
    ) -> bool {
        false
    }

    /// A player asked for a stream that does not exist. Resolving the
    /// invoker force-closes the waiting player.
    fn on_stream_not_found(
        &self,
        info: &MediaInfo,
        sender: &dyn SockInfo,
        close_player: CloseInvoker,
    ) -> bool {
        false
    }

    /// An mp4 segment finished; `true` vetoes default finalization
    fn on_record_mp4(&self, info: &RecordInfo) -> bool {
        false
    }

    /// A ts segment finished; `true` vetoes default finalization
    fn on_record_ts(&self, info: &RecordInfo) -> bool {
        false
    }

    /// A source has had no readers for the configured window. The
    /// handler may ask the source to close; ownership stays with the
    /// host either way.
    fn on_stream_none_reader(&self, source: &dyn MediaSource) -> bool {
        false
    }

    /// An outbound RTP send stopped with an error
    fn on_send_rtp_stopped(&self, muxer: &dyn Muxer, ssrc: &str, error: &str) -> bool {
        false
    }

    /// HTTP file access decision for `path` (`is_dir` for directory
    /// listings)
    fn on_http_access(
        &self,
        request: &dyn HttpRequestView,
        path: &str,
        is_dir: bool,
        invoker: HttpAccessInvoker,
        sender: &dyn SockInfo,
    ) -> bool {
        false
    }

    /// An allocated RTP server port timed out waiting for a stream
    fn on_rtp_server_timeout(
        &self,
        local_port: u16,
        media: &MediaInfo,
        tcp_mode: i32,
        reuse_port: bool,
        ssrc: u32,
    ) -> bool {
        false
    }

    /// Host configuration changed
    fn on_reload_config(&self) {}

    /// The host opened an output muxer; return a sink to shadow its
    /// track/frame lifecycle, or `None` to stay out of the pipeline
    fn on_create_muxer(&self, muxer: &dyn Muxer) -> Option<Box<dyn MuxerSink>> {
        None
    }
}

/// Host-facing dispatch wrapper
///
/// Catches handler panics, logs them at error level, and reports the
/// event as unhandled (`false`) so the host applies its default logic.
/// This is the failure policy for the whole table: no error from this
/// layer may cross back into a host-owned call frame.
pub struct Dispatcher {
    handler: Arc<dyn EventHandler>,
}

impl Dispatcher {
    pub fn new(handler: Arc<dyn EventHandler>) -> Self {
        Self { handler }
    }

    fn guard(&self, event: &str, f: impl FnOnce() -> bool) -> bool {
        match catch_unwind(AssertUnwindSafe(f)) {
            Ok(handled) => {
                tracing::trace!(event, handled, "dispatched host event");
                handled
            }
            Err(panic) => {
                log_error!(
                    "handler panicked during '{}' event: {}",
                    event,
                    panic_message(&panic)
                );
                false
            }
        }
    }

    fn guard_unit(&self, event: &str, f: impl FnOnce()) {
        if let Err(panic) = catch_unwind(AssertUnwindSafe(f)) {
            log_error!(
                "handler panicked during '{}' event: {}",
                event,
                panic_message(&panic)
            );
        }
    }

    pub fn on_start(&self) {
        self.guard_unit("start", || self.handler.on_start());
    }

    pub fn on_exit(&self) {
        self.guard_unit("exit", || self.handler.on_exit());
    }

    pub fn on_publish(
        &self,
        origin: &str,
        info: &MediaInfo,
        invoker: PublishInvoker,
        sender: &dyn SockInfo,
    ) -> bool {
        self.guard("publish", || {
            self.handler.on_publish(origin, info, invoker, sender)
        })
    }

    pub fn on_play(&self, info: &MediaInfo, invoker: PlayInvoker, sender: &dyn SockInfo) -> bool {
        self.guard("play", || self.handler.on_play(info, invoker, sender))
    }

    pub fn on_flow_report(
        &self,
        info: &MediaInfo,
        report: &FlowReport,
        sender: &dyn SockInfo,
    ) -> bool {
        self.guard("flow_report", || {
            self.handler.on_flow_report(info, report, sender)
        })
    }

    pub fn on_media_changed(&self, registered: bool, source: &dyn MediaSource) -> bool {
        self.guard("media_changed", || {
            self.handler.on_media_changed(registered, source)
        })
    }

    pub fn on_player_proxy_failed(&self, url: &str, media: &MediaInfo, error: &str) -> bool {
        self.guard("player_proxy_failed", || {
            self.handler.on_player_proxy_failed(url, media, error)
        })
    }

    pub fn on_get_rtsp_realm(
        &self,
        info: &MediaInfo,
        invoker: RealmInvoker,
        sender: &dyn SockInfo,
    ) -> bool {
        self.guard("rtsp_get_realm", || {
            self.handler.on_get_rtsp_realm(info, invoker, sender)
        })
    }

    pub fn on_rtsp_auth(
        &self,
        info: &MediaInfo,
        realm: &str,
        user_name: &str,
        must_no_encrypt: bool,
        invoker: RtspAuthInvoker,
        sender: &dyn SockInfo,
    ) -> bool {
        self.guard("rtsp_auth", || {
            self.handler
                .on_rtsp_auth(info, realm, user_name, must_no_encrypt, invoker, sender)
        })
    }

    pub fn on_stream_not_found(
        &self,
        info: &MediaInfo,
        sender: &dyn SockInfo,
        close_player: CloseInvoker,
    ) -> bool {
        self.guard("stream_not_found", || {
            self.handler.on_stream_not_found(info, sender, close_player)
        })
    }

    pub fn on_record_mp4(&self, info: &RecordInfo) -> bool {
        self.guard("record_mp4", || self.handler.on_record_mp4(info))
    }

    pub fn on_record_ts(&self, info: &RecordInfo) -> bool {
        self.guard("record_ts", || self.handler.on_record_ts(info))
    }

    pub fn on_stream_none_reader(&self, source: &dyn MediaSource) -> bool {
        self.guard("stream_none_reader", || {
            self.handler.on_stream_none_reader(source)
        })
    }

    pub fn on_send_rtp_stopped(&self, muxer: &dyn Muxer, ssrc: &str, error: &str) -> bool {
        self.guard("send_rtp_stopped", || {
            self.handler.on_send_rtp_stopped(muxer, ssrc, error)
        })
    }

    pub fn on_http_access(
        &self,
        request: &dyn HttpRequestView,
        path: &str,
        is_dir: bool,
        invoker: HttpAccessInvoker,
        sender: &dyn SockInfo,
    ) -> bool {
        self.guard("http_access", || {
            self.handler
                .on_http_access(request, path, is_dir, invoker, sender)
        })
    }

    pub fn on_rtp_server_timeout(
        &self,
        local_port: u16,
        media: &MediaInfo,
        tcp_mode: i32,
        reuse_port: bool,
        ssrc: u32,
    ) -> bool {
        self.guard("rtp_server_timeout", || {
            self.handler
                .on_rtp_server_timeout(local_port, media, tcp_mode, reuse_port, ssrc)
        })
    }

    pub fn on_reload_config(&self) {
        self.guard_unit("reload_config", || self.handler.on_reload_config());
    }

    /// Returns the proxy the host should drive for this muxer, or
    /// `None` when the handler stays out of the pipeline (also on
    /// handler panic)
    pub fn on_create_muxer(&self, muxer: &dyn Muxer) -> Option<MuxerProxy> {
        let sink = match catch_unwind(AssertUnwindSafe(|| self.handler.on_create_muxer(muxer))) {
            Ok(sink) => sink,
            Err(panic) => {
                log_error!(
                    "handler panicked during 'create_muxer' event: {}",
                    panic_message(&panic)
                );
                None
            }
        };
        sink.map(MuxerProxy::new)
    }
}
