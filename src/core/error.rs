//! Error types for scheduler operations.

use thiserror::Error;

/// Errors produced by scheduler construction and configuration.
///
/// Runtime outcomes the scheduler treats as normal — rejection while paused,
/// cancelling an unknown id — are reported as `bool` returns on the facade,
/// not as errors. A failing task is caught at the lane boundary and logged;
/// it is never surfaced through this type.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// Configuration validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A lane or timer thread could not be spawned.
    #[error("failed to spawn thread: {0}")]
    Spawn(String),
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
