//! Shared stream handles
//!
//! A [`StreamHandle`] wraps a producer's [`ByteSource`] so it can sit in the
//! registry, be looked up from another thread, and be handed to exactly one
//! reader. Cloning a handle is cheap and refers to the same stream.

use std::fmt;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError, Weak};

use tokio::sync::watch;

use super::error::RegistryError;
use super::key::StreamKey;
use super::store::StreamRegistry;
use crate::source::{ByteSource, ReadOutcome};

static NEXT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);

struct HandleInner {
    id: u64,
    key: StreamKey,
    source: Mutex<Box<dyn ByteSource>>,
    /// Flips to true exactly once, on the first close
    closed: watch::Sender<bool>,
    /// Set by the one adapter allowed to read this stream
    claimed: AtomicBool,
    /// Registry this handle was registered in, for removal on completion
    registry: OnceLock<Weak<StreamRegistry>>,
}

impl Drop for HandleInner {
    fn drop(&mut self) {
        if *self.closed.borrow() {
            return;
        }

        let source = self.source.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = source.close() {
            tracing::warn!(stream = %self.key, error = %e, "Failed to close dropped stream");
        }
    }
}

/// Cloneable handle to a registered byte source
#[derive(Clone)]
pub struct StreamHandle {
    inner: Arc<HandleInner>,
}

impl StreamHandle {
    /// Wrap a byte source under the given key
    pub fn new(key: StreamKey, source: impl ByteSource + 'static) -> Self {
        let (closed, _) = watch::channel(false);

        Self {
            inner: Arc::new(HandleInner {
                id: NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed),
                key,
                source: Mutex::new(Box::new(source)),
                closed,
                claimed: AtomicBool::new(false),
                registry: OnceLock::new(),
            }),
        }
    }

    /// Process-unique handle ID
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Key this handle was created under
    pub fn key(&self) -> &StreamKey {
        &self.inner.key
    }

    /// Read from the underlying source
    ///
    /// Once the handle is closed every read reports `EndOfStream` without
    /// touching the source.
    pub fn read(&self, buf: &mut [u8]) -> io::Result<ReadOutcome> {
        let mut source = self
            .inner
            .source
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if self.is_closed() {
            return Ok(ReadOutcome::EndOfStream);
        }

        source.read(buf)
    }

    /// Close the underlying source
    ///
    /// Only the first call reaches the source; later calls return `Ok(())`.
    /// A read in progress on another thread finishes before the source is
    /// closed.
    pub fn close(&self) -> io::Result<()> {
        if self.inner.closed.send_replace(true) {
            return Ok(());
        }

        let result = self
            .inner
            .source
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .close();

        tracing::debug!(
            stream = %self.inner.key,
            handle_id = self.inner.id,
            ok = result.is_ok(),
            "Stream handle closed"
        );

        result
    }

    /// Whether the handle has been closed
    pub fn is_closed(&self) -> bool {
        *self.inner.closed.borrow()
    }

    /// Whether an adapter has claimed this handle for reading
    pub fn is_claimed(&self) -> bool {
        self.inner.claimed.load(Ordering::Acquire)
    }

    /// Whether both handles refer to the same stream
    pub fn same_stream(&self, other: &StreamHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Take exclusive read ownership
    pub(crate) fn claim(&self) -> Result<(), RegistryError> {
        if self.is_closed() {
            return Err(RegistryError::StreamClosed(self.inner.key.clone()));
        }

        self.inner
            .claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|_| RegistryError::AlreadyClaimed(self.inner.key.clone()))
    }

    /// Subscribe to the closed flag
    pub(crate) fn closed_signal(&self) -> watch::Receiver<bool> {
        self.inner.closed.subscribe()
    }

    /// Remember the registry holding this handle (first registration wins)
    pub(super) fn bind_registry(&self, registry: Weak<StreamRegistry>) {
        let _ = self.inner.registry.set(registry);
    }

    /// Registry this handle was registered in, if it is still alive
    pub(crate) fn registry(&self) -> Option<Arc<StreamRegistry>> {
        self.inner.registry.get().and_then(Weak::upgrade)
    }
}

impl fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamHandle")
            .field("id", &self.inner.id)
            .field("key", &self.inner.key)
            .field("closed", &self.is_closed())
            .field("claimed", &self.is_claimed())
            .finish()
    }
}
