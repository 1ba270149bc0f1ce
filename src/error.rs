//! Error types

use thiserror::Error;

/// Errors a caller can get back from the session controller.
///
/// Precondition violations (pausing while resting, resuming while idle, ...)
/// are not errors; those commands are no-ops.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("invalid workout: {0}")]
    InvalidWorkout(String),
    #[error("unknown workout: {0}")]
    UnknownWorkout(String),
    #[error("a session for workout {0} is already active")]
    SessionActive(String),
}

/// Failure to start the tick clock. The controller degrades to wall-clock
/// reconciliation instead of aborting.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClockError {
    #[error("no async runtime available to drive the tick clock")]
    NoRuntime,
    #[error("tick clock unavailable: {0}")]
    Unavailable(String),
}
