//! In-memory producer pipe
//!
//! Bridges a producer task (decoder, network fetch) to the relay. The writer
//! half appends PCM bytes, the reader half implements [`ByteSource`] and is
//! what gets registered.
//!
//! The pipe is bounded: once `capacity` bytes are buffered, [`StreamWriter::write`]
//! waits until the reader drains some of them. This keeps a fast producer from
//! running far ahead of playback.

use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use bytes::BytesMut;
use tokio::sync::Notify;

use super::{ByteSource, ReadOutcome};
use crate::relay::PcmFormat;

/// Pipe configuration
#[derive(Debug, Clone)]
pub struct PipeConfig {
    /// Maximum number of buffered bytes before writes wait
    pub capacity: usize,

    /// Bytes that must be buffered before the stream counts as pre-buffered
    pub prebuffer_bytes: usize,
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            capacity: 192_000,      // 2s of 48kHz mono s16
            prebuffer_bytes: 9_600, // 100ms of 48kHz mono s16
        }
    }
}

impl PipeConfig {
    /// Size the pipe to hold `buffer` worth of audio in `format`
    pub fn buffered(format: &PcmFormat, buffer: Duration) -> Self {
        Self {
            capacity: format.bytes_for(buffer).max(format.frame_size()),
            ..Default::default()
        }
    }

    /// Set the capacity in bytes
    pub fn capacity(mut self, bytes: usize) -> Self {
        self.capacity = bytes.max(1);
        self
    }

    /// Set the pre-buffer threshold in bytes
    pub fn prebuffer_bytes(mut self, bytes: usize) -> Self {
        self.prebuffer_bytes = bytes;
        self
    }
}

#[derive(Debug, Default)]
struct PipeState {
    buffer: BytesMut,
    finished: bool,
    failure: Option<(io::ErrorKind, String)>,
    reader_closed: bool,
    total_written: u64,
    total_read: u64,
}

impl PipeState {
    fn failure(&self) -> Option<io::Error> {
        self.failure
            .as_ref()
            .map(|(kind, msg)| io::Error::new(*kind, msg.clone()))
    }
}

#[derive(Debug)]
struct Shared {
    state: Mutex<PipeState>,
    /// Signalled when bytes are appended or the producer finishes
    data: Notify,
    /// Signalled when the reader drains bytes or closes
    space: Notify,
    config: PipeConfig,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, PipeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark the reader gone and wake a writer waiting for space
    fn close_reader(&self) {
        {
            let mut state = self.lock();
            if state.reader_closed {
                return;
            }
            state.reader_closed = true;
            state.buffer.clear();
        }
        self.space.notify_waiters();
        self.data.notify_waiters();
    }
}

/// Create a new pipe
///
/// A zero capacity is raised to one byte so writes can always make progress.
pub fn pipe(mut config: PipeConfig) -> (StreamWriter, StreamReader) {
    config.capacity = config.capacity.max(1);

    let shared = Arc::new(Shared {
        state: Mutex::new(PipeState::default()),
        data: Notify::new(),
        space: Notify::new(),
        config,
    });

    (
        StreamWriter {
            shared: Arc::clone(&shared),
            done: false,
        },
        StreamReader { shared },
    )
}

/// Producer half of a pipe
///
/// Dropping the writer without calling [`finish`](Self::finish) or
/// [`fail`](Self::fail) ends the stream normally.
#[derive(Debug)]
pub struct StreamWriter {
    shared: Arc<Shared>,
    done: bool,
}

impl StreamWriter {
    /// Append bytes, waiting while the pipe is full
    ///
    /// A chunk larger than the capacity is accepted once the pipe is empty.
    /// Fails with `BrokenPipe` once the reader has closed.
    pub async fn write(&self, data: &[u8]) -> io::Result<()> {
        if data.is_empty() {
            return Ok(());
        }

        loop {
            let space = self.shared.space.notified();
            tokio::pin!(space);
            space.as_mut().enable();

            {
                let mut state = self.shared.lock();
                if state.reader_closed {
                    return Err(reader_closed());
                }

                let fits = state.buffer.len() + data.len() <= self.shared.config.capacity;
                if state.buffer.is_empty() || fits {
                    state.buffer.extend_from_slice(data);
                    state.total_written += data.len() as u64;
                    drop(state);
                    self.shared.data.notify_waiters();
                    return Ok(());
                }
            }

            space.await;
        }
    }

    /// Append as many bytes as currently fit without waiting
    ///
    /// Returns the number of bytes accepted.
    pub fn try_write(&self, data: &[u8]) -> io::Result<usize> {
        let mut state = self.shared.lock();
        if state.reader_closed {
            return Err(reader_closed());
        }

        let room = self
            .shared
            .config
            .capacity
            .saturating_sub(state.buffer.len());
        let n = room.min(data.len());
        if n > 0 {
            state.buffer.extend_from_slice(&data[..n]);
            state.total_written += n as u64;
            drop(state);
            self.shared.data.notify_waiters();
        }
        Ok(n)
    }

    /// Signal that the producer is done; buffered bytes stay readable
    pub fn finish(mut self) {
        self.mark_done(None);
    }

    /// Signal that the producer failed
    ///
    /// The reader still drains buffered bytes, then reports `err` on every
    /// further read.
    pub fn fail(mut self, err: io::Error) {
        self.mark_done(Some((err.kind(), err.to_string())));
    }

    /// Whether the reader has closed (producer should stop)
    pub fn is_reader_closed(&self) -> bool {
        self.shared.lock().reader_closed
    }

    /// Bytes currently buffered
    pub fn buffered(&self) -> usize {
        self.shared.lock().buffer.len()
    }

    /// Get a monitor for this pipe
    pub fn monitor(&self) -> PipeMonitor {
        PipeMonitor {
            shared: Arc::clone(&self.shared),
        }
    }

    fn mark_done(&mut self, failure: Option<(io::ErrorKind, String)>) {
        if self.done {
            return;
        }
        self.done = true;

        {
            let mut state = self.shared.lock();
            state.finished = true;
            state.failure = failure;

            tracing::debug!(
                written = state.total_written,
                buffered = state.buffer.len(),
                failed = state.failure.is_some(),
                "Producer finished"
            );
        }
        self.shared.data.notify_waiters();
    }
}

impl Drop for StreamWriter {
    fn drop(&mut self) {
        self.mark_done(None);
    }
}

/// Consumer half of a pipe
#[derive(Debug)]
pub struct StreamReader {
    shared: Arc<Shared>,
}

impl StreamReader {
    /// Get a monitor for this pipe
    pub fn monitor(&self) -> PipeMonitor {
        PipeMonitor {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl ByteSource for StreamReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<ReadOutcome> {
        let mut state = self.shared.lock();

        if state.reader_closed {
            return Ok(ReadOutcome::EndOfStream);
        }

        if !state.buffer.is_empty() {
            if buf.is_empty() {
                return Ok(ReadOutcome::Pending);
            }
            let n = buf.len().min(state.buffer.len());
            let chunk = state.buffer.split_to(n);
            buf[..n].copy_from_slice(&chunk);
            state.total_read += n as u64;
            drop(state);
            self.shared.space.notify_waiters();
            return Ok(ReadOutcome::Data(n));
        }

        if let Some(err) = state.failure() {
            return Err(err);
        }

        if state.finished {
            Ok(ReadOutcome::EndOfStream)
        } else {
            Ok(ReadOutcome::Pending)
        }
    }

    fn close(&mut self) -> io::Result<()> {
        self.shared.close_reader();
        Ok(())
    }
}

impl Drop for StreamReader {
    fn drop(&mut self) {
        self.shared.close_reader();
    }
}

/// Read-only view of a pipe's fill level
#[derive(Debug, Clone)]
pub struct PipeMonitor {
    shared: Arc<Shared>,
}

impl PipeMonitor {
    /// Bytes currently buffered
    pub fn buffered(&self) -> usize {
        self.shared.lock().buffer.len()
    }

    /// Whether the producer has finished (normally or with a failure)
    pub fn is_finished(&self) -> bool {
        self.shared.lock().finished
    }

    /// Total bytes written by the producer
    pub fn total_written(&self) -> u64 {
        self.shared.lock().total_written
    }

    /// Total bytes drained by the reader
    pub fn total_read(&self) -> u64 {
        self.shared.lock().total_read
    }

    /// Wait until the pre-buffer threshold is reached
    ///
    /// Resolves `Ok(true)` once enough bytes are buffered or the producer
    /// finished, `Ok(false)` if `timeout` elapses first, and `Err` if the
    /// producer failed before buffering anything.
    pub async fn wait_prebuffered(&self, timeout: Duration) -> io::Result<bool> {
        let threshold = self.shared.config.prebuffer_bytes;

        let wait = async {
            loop {
                let data = self.shared.data.notified();
                tokio::pin!(data);
                data.as_mut().enable();

                {
                    let state = self.shared.lock();
                    if state.buffer.is_empty() {
                        if let Some(err) = state.failure() {
                            return Err(err);
                        }
                    }
                    if state.buffer.len() >= threshold || state.finished || state.reader_closed {
                        return Ok(state.buffer.len());
                    }
                }

                data.await;
            }
        };

        match tokio::time::timeout(timeout, wait).await {
            Ok(Ok(buffered)) => {
                tracing::debug!(buffered = buffered, "Pre-buffering complete");
                Ok(true)
            }
            Ok(Err(e)) => Err(e),
            Err(_) => {
                tracing::warn!(
                    timeout_ms = timeout.as_millis() as u64,
                    buffered = self.buffered(),
                    "Pre-buffering timed out"
                );
                Ok(false)
            }
        }
    }
}

fn reader_closed() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "stream reader closed")
}
