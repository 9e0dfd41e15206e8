//! Error types for the mediahook core layer

use thiserror::Error;

/// Result type alias for mediahook core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the mediahook core layer
///
/// None of these may cross back into a host-owned call frame; dispatch
/// entry points translate them into logs plus a `false` return.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or unexpected arguments on a host call
    #[error("Host call error: {0}")]
    HostCall(String),

    /// Host configuration lookup error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Logging backend error (e.g. a sink installed twice)
    #[error("Logging error: {0}")]
    Logging(String),
}
