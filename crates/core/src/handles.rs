//! Opaque host handle traits
//!
//! The host media engine owns every media object; this layer only ever
//! borrows them for the duration of a call. Each handle is modelled as
//! a small trait exposing the operations this layer actually uses, so
//! tests can substitute fakes without a host process.
//!
//! Ownership never transfers into this layer. Handles must not be
//! retained past the call that delivered them, with two exceptions
//! spelled out in the dispatch contract: a `DecisionInvoker` may be
//! held for deferred resolution, and the async bridge may hold a
//! request snapshot.

/// Track media kind, as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackType {
    Invalid,
    Video,
    Audio,
    Title,
    Application,
}

impl TrackType {
    pub fn name(self) -> &'static str {
        match self {
            TrackType::Invalid => "invalid",
            TrackType::Video => "video",
            TrackType::Audio => "audio",
            TrackType::Title => "title",
            TrackType::Application => "application",
        }
    }
}

/// A registered media source (one live stream on the host)
pub trait MediaSource {
    /// Protocol schema, e.g. `rtsp` / `rtmp`
    fn schema(&self) -> String;

    /// Full stream url
    fn url(&self) -> String;

    /// Readers on this source's own protocol
    fn reader_count(&self) -> usize;

    /// Readers across all protocols muxed from this source
    fn total_reader_count(&self) -> usize;

    /// Ask the host to close this source. A request, not a destroy:
    /// the host still owns the object and decides when it dies.
    fn close(&self, force: bool) -> bool;
}

/// A negotiated codec track
pub trait Track {
    fn codec_name(&self) -> String;
    fn track_type(&self) -> TrackType;
    /// Whether the track has enough config data to be muxed
    fn ready(&self) -> bool;
}

/// One media frame flowing through the host pipeline
pub trait Frame {
    fn dts(&self) -> u64;
    fn pts(&self) -> u64;
    fn key_frame(&self) -> bool;
    fn size(&self) -> usize;
    fn track_type(&self) -> TrackType;
}

/// The host-side output muxer a [`MuxerSink`](crate::muxer::MuxerSink)
/// shadows
pub trait Muxer {
    fn short_url(&self) -> String;
    fn total_reader_count(&self) -> usize;
    fn is_enabled(&self) -> bool;
}

/// Peer/transport info for the session that triggered an event
pub trait SockInfo {
    fn peer_addr(&self) -> String;
    fn local_addr(&self) -> String;
    /// Host-unique session identifier
    fn identifier(&self) -> String;
}

/// Read-only view over a parsed HTTP request held by the host
///
/// Backs both the `http_access` event and the bridge interceptor. The
/// body is fully pre-read by the host; there are no chunked request
/// bodies at this boundary.
pub trait HttpRequestView {
    fn method(&self) -> &str;
    fn path(&self) -> &str;
    fn query(&self) -> &str;
    fn headers(&self) -> Vec<(String, String)>;
    fn header(&self, name: &str) -> Option<String> {
        let name = name.to_ascii_lowercase();
        self.headers()
            .into_iter()
            .find(|(k, _)| k.to_ascii_lowercase() == name)
            .map(|(_, v)| v)
    }
    fn body(&self) -> &[u8];
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeRequest;

    impl HttpRequestView for FakeRequest {
        fn method(&self) -> &str {
            "GET"
        }
        fn path(&self) -> &str {
            "/index/api/version"
        }
        fn query(&self) -> &str {
            ""
        }
        fn headers(&self) -> Vec<(String, String)> {
            vec![
                ("Content-Type".into(), "application/json".into()),
                ("X-Forwarded-For".into(), "10.0.0.2".into()),
            ]
        }
        fn body(&self) -> &[u8] {
            b""
        }
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let req = FakeRequest;
        assert_eq!(
            req.header("content-type").as_deref(),
            Some("application/json")
        );
        assert_eq!(req.header("x-forwarded-for").as_deref(), Some("10.0.0.2"));
        assert_eq!(req.header("authorization"), None);
    }
}
