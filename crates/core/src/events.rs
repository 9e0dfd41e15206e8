//! Event payload records
//!
//! Plain data carried by host events. The host serializes these to
//! key/value form on its side of the boundary; they derive serde so
//! handlers and tests can round them through JSON the same way.

use serde::{Deserialize, Serialize};

/// Identity of one stream: `vhost/app/stream` plus raw url params
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaInfo {
    /// Protocol schema of the triggering request (`rtmp`, `rtsp`, ...)
    pub schema: String,
    pub vhost: String,
    pub app: String,
    pub stream: String,
    /// Raw query-string parameters from the stream url
    pub params: String,
}

impl MediaInfo {
    /// Compact `vhost/app/stream` form used in log lines
    pub fn short_url(&self) -> String {
        format!("{}/{}/{}", self.vhost, self.app, self.stream)
    }
}

/// Traffic statistics reported when a session ends
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowReport {
    pub total_bytes: u64,
    pub duration_secs: u64,
    /// True when the session was a player, false for a publisher
    pub is_player: bool,
}

/// Metadata for a finished recording segment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordInfo {
    /// Unix timestamp of the segment start
    pub start_time: u64,
    /// Segment duration in seconds
    pub time_len_secs: f32,
    pub file_path: String,
    pub file_name: String,
    pub folder: String,
    /// Playback url for the finished file
    pub url: String,
    pub media: MediaInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_url() {
        let info = MediaInfo {
            schema: "rtmp".into(),
            vhost: "__defaultVhost__".into(),
            app: "live".into(),
            stream: "cam01".into(),
            params: "token=abc".into(),
        };
        assert_eq!(info.short_url(), "__defaultVhost__/live/cam01");
    }

    #[test]
    fn test_record_info_round_trips_through_json() {
        let info = RecordInfo {
            start_time: 1_700_000_000,
            time_len_secs: 30.5,
            file_path: "/var/record/live/cam01/0.mp4".into(),
            file_name: "0.mp4".into(),
            folder: "/var/record/live/cam01".into(),
            url: "record/live/cam01/0.mp4".into(),
            media: MediaInfo {
                schema: "rtmp".into(),
                vhost: "__defaultVhost__".into(),
                app: "live".into(),
                stream: "cam01".into(),
                params: String::new(),
            },
        };
        let json = serde_json::to_string(&info).unwrap();
        let back: RecordInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(back, info);
    }
}
