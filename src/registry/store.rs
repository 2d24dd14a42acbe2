//! Stream registry implementation
//!
//! The registry hands streams from producers to the relay by key. Producers
//! register a handle as soon as they start supplying bytes; the playback side
//! looks it up (possibly before any byte has arrived) and wraps it in a
//! [`PullAdapter`].

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::config::RegistryConfig;
use super::error::RegistryError;
use super::handle::StreamHandle;
use super::key::StreamKey;
use crate::relay::{PullAdapter, RelayConfig};
use crate::source::ByteSource;

/// Central registry for all live streams
///
/// Thread-safe via `RwLock`. The lock is never held across I/O or an
/// `.await`; handles are closed after the map has been updated, so a slow
/// `close` never stalls a concurrent lookup.
pub struct StreamRegistry {
    /// Map of stream key to stream handle
    streams: RwLock<HashMap<StreamKey, StreamHandle>>,

    /// Configuration
    config: RegistryConfig,
}

impl StreamRegistry {
    /// Create a new stream registry with default configuration
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a new stream registry with custom configuration
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            streams: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Get the registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn read_streams(&self) -> RwLockReadGuard<'_, HashMap<StreamKey, StreamHandle>> {
        self.streams.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_streams(&self) -> RwLockWriteGuard<'_, HashMap<StreamKey, StreamHandle>> {
        self.streams.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a handle under its key
    ///
    /// If a different handle is already registered under the same key it is
    /// replaced and closed, unless `replace_existing` is disabled, in which
    /// case this fails with `AlreadyRegistered`. Registering the same handle
    /// twice is a no-op.
    pub fn register(self: &Arc<Self>, handle: StreamHandle) -> Result<(), RegistryError> {
        let key = handle.key().clone();

        if handle.is_closed() {
            return Err(RegistryError::StreamClosed(key));
        }

        let replaced = {
            let mut streams = self.write_streams();

            match streams.get(&key) {
                Some(existing) if existing.same_stream(&handle) => return Ok(()),
                Some(_) if !self.config.replace_existing => {
                    return Err(RegistryError::AlreadyRegistered(key));
                }
                Some(_) | None => {}
            }

            handle.bind_registry(Arc::downgrade(self));
            streams.insert(key.clone(), handle.clone())
        };

        match replaced {
            Some(old) => {
                tracing::info!(
                    stream = %key,
                    old_handle = old.id(),
                    new_handle = handle.id(),
                    "Stream replaced"
                );
                if let Err(e) = old.close() {
                    tracing::warn!(stream = %key, error = %e, "Failed to close replaced stream");
                }
            }
            None => {
                tracing::info!(stream = %key, handle_id = handle.id(), "Stream registered");
            }
        }

        Ok(())
    }

    /// Wrap a byte source in a handle and register it
    pub fn register_source(
        self: &Arc<Self>,
        key: StreamKey,
        source: impl ByteSource + 'static,
    ) -> Result<StreamHandle, RegistryError> {
        let handle = StreamHandle::new(key, source);
        self.register(handle.clone())?;
        Ok(handle)
    }

    /// Look up a stream without removing it
    pub fn lookup(&self, key: &StreamKey) -> Option<StreamHandle> {
        self.read_streams().get(key).cloned()
    }

    /// Check if a stream is registered
    pub fn contains(&self, key: &StreamKey) -> bool {
        self.read_streams().contains_key(key)
    }

    /// Remove a stream and close its handle
    ///
    /// Returns `Ok(false)` if nothing was registered under `key`. The entry
    /// is removed even when closing the handle fails.
    pub fn unregister(&self, key: &StreamKey) -> io::Result<bool> {
        let removed = self.write_streams().remove(key);

        match removed {
            Some(handle) => {
                tracing::info!(stream = %key, handle_id = handle.id(), "Stream unregistered");
                handle.close()?;
                Ok(true)
            }
            None => {
                tracing::debug!(stream = %key, "Unregister of unknown stream ignored");
                Ok(false)
            }
        }
    }

    /// Remove `key` only if it still maps to `handle`
    ///
    /// Used by a finished reader to drop its own entry without touching a
    /// replacement registered in the meantime. Does not close anything.
    pub fn remove_if_current(&self, key: &StreamKey, handle: &StreamHandle) -> bool {
        let mut streams = self.write_streams();

        match streams.get(key) {
            Some(current) if current.same_stream(handle) => {
                streams.remove(key);
                tracing::debug!(stream = %key, handle_id = handle.id(), "Stream removed after completion");
                true
            }
            _ => false,
        }
    }

    /// Open a pull adapter on a registered stream
    pub fn open(&self, key: &StreamKey, config: &RelayConfig) -> crate::Result<PullAdapter> {
        let handle = self
            .lookup(key)
            .ok_or_else(|| RegistryError::StreamNotFound(key.clone()))?;

        PullAdapter::new(handle, config)
    }

    /// Keys of all registered streams
    pub fn keys(&self) -> Vec<StreamKey> {
        self.read_streams().keys().cloned().collect()
    }

    /// Get total number of streams
    pub fn len(&self) -> usize {
        self.read_streams().len()
    }

    /// Whether no streams are registered
    pub fn is_empty(&self) -> bool {
        self.read_streams().is_empty()
    }

    /// Remove and close every stream
    ///
    /// Returns the number of streams removed.
    pub fn clear(&self) -> usize {
        let drained: Vec<(StreamKey, StreamHandle)> = self.write_streams().drain().collect();

        for (key, handle) in &drained {
            if let Err(e) = handle.close() {
                tracing::warn!(stream = %key, error = %e, "Failed to close stream during clear");
            }
        }

        if !drained.is_empty() {
            tracing::info!(count = drained.len(), "Registry cleared");
        }
        drained.len()
    }
}

impl Default for StreamRegistry {
    fn default() -> Self {
        Self::new()
    }
}
