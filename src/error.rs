//! Error types for the PCM relay
//!
//! Transient unavailability and genuine completion are not errors; they are
//! reported through `ReadOutcome` and `PullResult`. Everything here is a real
//! failure the caller has to see.

use std::fmt;
use std::io;

use crate::registry::RegistryError;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Crate-wide error type
#[derive(Debug)]
pub enum Error {
    /// The underlying byte source failed to read or close
    Io(io::Error),
    /// A blocking wait was interrupted before data or end-of-stream arrived
    Interrupted,
    /// The adapter was already closed when the operation was attempted
    Closed,
    /// Registry lookup or registration failed
    Registry(RegistryError),
    /// The background construction task did not complete
    Worker(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::Interrupted => write!(f, "Read interrupted while waiting for data"),
            Error::Closed => write!(f, "Adapter is closed"),
            Error::Registry(e) => write!(f, "Registry error: {}", e),
            Error::Worker(msg) => write!(f, "Worker task failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Registry(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<RegistryError> for Error {
    fn from(e: RegistryError) -> Self {
        Error::Registry(e)
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(e: tokio::task::JoinError) -> Self {
        Error::Worker(e.to_string())
    }
}
