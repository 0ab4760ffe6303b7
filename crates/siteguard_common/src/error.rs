//! Validation errors shared by the daemon's verb handlers.

use thiserror::Error;

/// Input validation failures. These are rejected synchronously before any
/// state is mutated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("origin missing or invalid: {0:?}")]
    InvalidOrigin(String),

    #[error("hostname missing")]
    MissingHostname,

    #[error("hour out of range (0-23): {0}")]
    InvalidHour(u32),
}
