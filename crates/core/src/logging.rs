//! Logging facade forwarding to the host's structured log channel
//!
//! The host process owns the real logger. At startup the embedding glue
//! may install a [`LogSink`] that forwards `(level, file, line, func,
//! message)` into the host's logging channel; when nothing is installed
//! the facade falls back to stderr. The backend is fixed for the
//! process lifetime; first use wins.
//!
//! Call sites are captured explicitly by the [`log_trace!`] ..
//! [`log_error!`](crate::log_error) macros (`file!()` / `line!()` /
//! `module_path!()`), so attribution is always the original caller, not
//! this module.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::OnceLock;

use crate::{Error, Result};

/// Log severity, ordered. Integer values match the host channel's
/// `level` parameter (0..4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl LogLevel {
    /// Integer value forwarded to the host channel
    pub fn as_int(self) -> u8 {
        self as u8
    }

    /// Human-readable level name
    pub fn name(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Backend for the logging facade
///
/// Implementations must not panic and must not block materially; the
/// facade is called from host worker threads and from the scheduler
/// thread.
pub trait LogSink: Send + Sync {
    fn log(&self, level: LogLevel, file: &str, line: u32, func: &str, message: &str);
}

/// Fallback sink used when no host channel was installed
pub struct StderrSink;

impl LogSink for StderrSink {
    fn log(&self, _level: LogLevel, file: &str, line: u32, func: &str, message: &str) {
        eprintln!("[{}:{}] {} | {}", file, line, func, message);
    }
}

static SINK: OnceLock<Box<dyn LogSink>> = OnceLock::new();

/// Install the host log sink. Must run before the first log call;
/// the backend cannot be swapped once selected.
pub fn install_sink(sink: Box<dyn LogSink>) -> Result<()> {
    SINK.set(sink)
        .map_err(|_| Error::Logging("log backend already selected".into()))
}

fn sink() -> &'static dyn LogSink {
    // In the unit-test binary the backend slot must not be won by
    // whichever test emits first; route every emission through the
    // shared recorder so log assertions are order-independent.
    #[cfg(test)]
    test_log::recorder();

    SINK.get_or_init(|| Box::new(StderrSink)).as_ref()
}

/// Format and emit one log line. Used by the level macros; not meant
/// to be called directly. Never panics: a misbehaving sink is
/// swallowed here rather than unwinding into a host call frame.
#[doc(hidden)]
pub fn emit(level: LogLevel, file: &str, line: u32, func: &str, args: fmt::Arguments<'_>) {
    let message = fmt::format(args);
    let _ = catch_unwind(AssertUnwindSafe(|| {
        sink().log(level, file, line, func, &message);
    }));
}

/// Log at an explicit [`LogLevel`], capturing the call site.
#[macro_export]
macro_rules! host_log {
    ($level:expr, $($arg:tt)+) => {
        $crate::logging::emit($level, file!(), line!(), module_path!(), format_args!($($arg)+))
    };
}

/// Log at trace level through the facade
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)+) => { $crate::host_log!($crate::logging::LogLevel::Trace, $($arg)+) };
}

/// Log at debug level through the facade
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)+) => { $crate::host_log!($crate::logging::LogLevel::Debug, $($arg)+) };
}

/// Log at info level through the facade
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)+) => { $crate::host_log!($crate::logging::LogLevel::Info, $($arg)+) };
}

/// Log at warn level through the facade
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)+) => { $crate::host_log!($crate::logging::LogLevel::Warn, $($arg)+) };
}

/// Log at error level through the facade
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)+) => { $crate::host_log!($crate::logging::LogLevel::Error, $($arg)+) };
}
