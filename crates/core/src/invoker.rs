//! Deferred decision invokers
//!
//! The host hands out an invoker wherever it needs a yes/no (or
//! parameterized) answer: publish/play auth, RTSP realm/credentials,
//! HTTP access, closing a pending player. The handler may resolve it
//! synchronously inside the event call or stash it and resolve later
//! from another thread; the host contract is assumed to permit
//! cross-thread resolution.
//!
//! At most one resolve per invoker. [`DecisionInvoker::resolve`]
//! consumes the value, so a second resolve does not compile. An
//! invoker released without resolution is logged: at trace level by
//! default (the host applies its own default logic when a handler
//! returns `false`), at error level when the handler declared it will
//! resolve via [`DecisionInvoker::expecting_resolution`]. In that
//! case the host request stalls and the log line is the defect report.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{log_error, log_trace};

type Callback<T> = Box<dyn FnOnce(T) + Send>;

/// One-shot handle for answering a pending host decision
pub struct DecisionInvoker<T> {
    callback: Option<Callback<T>>,
    what: &'static str,
    must_resolve: bool,
}

impl<T> DecisionInvoker<T> {
    /// Wrap a host resolve callback. `what` names the decision in
    /// defect logs (e.g. `"publish_auth"`).
    pub fn new(what: &'static str, callback: impl FnOnce(T) + Send + 'static) -> Self {
        Self {
            callback: Some(Box::new(callback)),
            what,
            must_resolve: false,
        }
    }

    /// Mark this invoker as one the layer has taken responsibility
    /// for: dropping it unresolved becomes an error-level defect
    /// report instead of a trace line.
    pub fn expecting_resolution(mut self) -> Self {
        self.must_resolve = true;
        self
    }

    /// Decision name used in logs
    pub fn what(&self) -> &'static str {
        self.what
    }

    /// Answer the host. Consumes the invoker; resolving twice is
    /// unrepresentable.
    pub fn resolve(mut self, value: T) {
        if let Some(cb) = self.callback.take() {
            cb(value);
        }
    }
}

impl<T> Drop for DecisionInvoker<T> {
    fn drop(&mut self) {
        if self.callback.is_some() {
            if self.must_resolve {
                log_error!(
                    "decision invoker '{}' dropped without resolution; the host request will stall",
                    self.what
                );
            } else {
                log_trace!("decision invoker '{}' released unresolved, host default applies", self.what);
            }
        }
    }
}

impl<T> std::fmt::Debug for DecisionInvoker<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionInvoker")
            .field("what", &self.what)
            .field("pending", &self.callback.is_some())
            .finish()
    }
}

/// Answer for a publish auth decision: empty `error` allows, and
/// `options` override per-stream protocol settings (e.g. re-publish
/// flags).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishReply {
    /// Empty means allowed; otherwise the rejection reason
    pub error: String,
    /// Protocol option overrides, stringly keyed like the host config
    pub options: HashMap<String, String>,
}

impl PublishReply {
    pub fn allow(options: HashMap<String, String>) -> Self {
        Self {
            error: String::new(),
            options,
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            error: reason.into(),
            options: HashMap::new(),
        }
    }

    pub fn allowed(&self) -> bool {
        self.error.is_empty()
    }
}

/// Answer for a pass/fail auth decision (play auth)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthReply {
    /// Empty means allowed; otherwise the rejection reason
    pub error: String,
}

impl AuthReply {
    pub fn allow() -> Self {
        Self::default()
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            error: reason.into(),
        }
    }

    pub fn allowed(&self) -> bool {
        self.error.is_empty()
    }
}

/// RTSP credential answer: the stored password, either plain or
/// already md5-hashed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RtspCredential {
    /// True when `password` is the md5 form
    pub encrypted: bool,
    pub password: String,
}

/// Answer for an HTTP access decision
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessReply {
    /// Empty means granted; otherwise the denial reason
    pub error: String,
    /// Path prefix the grant covers
    pub access_path: String,
    /// Grant duration in seconds (cookie lifetime)
    pub cookie_ttl_secs: u32,
}

impl AccessReply {
    pub fn grant(access_path: impl Into<String>, cookie_ttl_secs: u32) -> Self {
        Self {
            error: String::new(),
            access_path: access_path.into(),
            cookie_ttl_secs,
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            error: reason.into(),
            access_path: String::new(),
            cookie_ttl_secs: 0,
        }
    }
}

/// Publish auth decision
pub type PublishInvoker = DecisionInvoker<PublishReply>;
/// Play auth decision
pub type PlayInvoker = DecisionInvoker<AuthReply>;
/// RTSP realm lookup
pub type RealmInvoker = DecisionInvoker<String>;
/// RTSP credential lookup
pub type RtspAuthInvoker = DecisionInvoker<RtspCredential>;
/// Force-close of a player waiting on a missing stream
pub type CloseInvoker = DecisionInvoker<()>;
/// HTTP access grant decision
pub type HttpAccessInvoker = DecisionInvoker<AccessReply>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::test_log;
    use crate::logging::LogLevel;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_resolve_fires_host_callback_exactly_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(parking_lot::Mutex::new(None));
        let invoker = {
            let count = count.clone();
            let seen = seen.clone();
            PublishInvoker::new("publish_auth", move |reply: PublishReply| {
                count.fetch_add(1, Ordering::SeqCst);
                *seen.lock() = Some(reply);
            })
        };

        let mut options = HashMap::new();
        options.insert("enable_rtmp".to_string(), "true".to_string());
        invoker.resolve(PublishReply::allow(options.clone()));

        assert_eq!(count.load(Ordering::SeqCst), 1);
        let reply = seen.lock().take().unwrap();
        assert!(reply.allowed());
        assert_eq!(reply.options, options);
    }

    #[test]
    fn test_drop_without_resolution_reports_defect() {
        let rec = test_log::recorder();
        {
            let _invoker = CloseInvoker::new("close-defect-probe", |_| {}).expecting_resolution();
            // dropped unresolved
        }
        let entries = rec.entries_containing("close-defect-probe");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, LogLevel::Error);
        assert!(entries[0].message.contains("dropped without resolution"));
    }

    #[test]
    fn test_plain_drop_is_quiet_at_error_level() {
        let rec = test_log::recorder();
        {
            let _invoker = PlayInvoker::new("play-quiet-probe", |_| {});
        }
        let entries = rec.entries_containing("play-quiet-probe");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, LogLevel::Trace);
    }

    #[test]
    fn test_resolution_from_another_thread() {
        let (tx, rx) = std::sync::mpsc::channel();
        let invoker = PlayInvoker::new("play_auth", move |reply: AuthReply| {
            tx.send(reply).unwrap();
        });

        let handle = std::thread::spawn(move || {
            invoker.resolve(AuthReply::deny("invalid token"));
        });
        handle.join().unwrap();

        let reply = rx.recv().unwrap();
        assert!(!reply.allowed());
        assert_eq!(reply.error, "invalid token");
    }
}
