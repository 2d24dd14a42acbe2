//! Registry error types
//!
//! Error types for stream registry operations.

use super::key::StreamKey;

/// Error type for registry operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Stream not found
    StreamNotFound(StreamKey),
    /// A stream is already registered under this key (replacement disabled)
    AlreadyRegistered(StreamKey),
    /// Another adapter is already reading this stream
    AlreadyClaimed(StreamKey),
    /// The stream's handle has been closed
    StreamClosed(StreamKey),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::StreamNotFound(key) => write!(f, "Stream not found: {}", key),
            RegistryError::AlreadyRegistered(key) => {
                write!(f, "Stream already registered: {}", key)
            }
            RegistryError::AlreadyClaimed(key) => {
                write!(f, "Stream already claimed by a reader: {}", key)
            }
            RegistryError::StreamClosed(key) => write!(f, "Stream closed: {}", key),
        }
    }
}

impl std::error::Error for RegistryError {}
