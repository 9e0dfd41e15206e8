//! Error types for the async bridge

use thiserror::Error;

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur in the bridge crate
#[derive(Debug, Error)]
pub enum Error {
    /// The scheduler thread or its runtime could not be started.
    /// Fatal to the whole bridge: registration with the host must not
    /// proceed.
    #[error("Failed to start scheduler: {0}")]
    SchedulerStart(#[from] std::io::Error),

    /// The scheduler is shut down; the submitted task was answered
    /// with the fixed failure response
    #[error("Scheduler is shut down")]
    Closed,
}
