//! Pull adapter
//!
//! Wraps one [`StreamHandle`] and serves the playback engine's pull contract:
//! a fixed output format, reads bounded by both the requested size and the
//! latency cap, and an explicit end-of-stream signal.
//!
//! # Read results
//!
//! ```text
//!   source outcome        PullResult            host reaction
//!   ─────────────────     ──────────────────    ─────────────────────
//!   Data(n)          ──►  Audio(n bytes)        render
//!   Pending          ──►  Pending               call read again later
//!   EndOfStream      ──►  Finished              stop the channel
//!   Err(e)           ──►  Err(Error::Io)        log, channel stays up
//! ```
//!
//! Under [`ReadPolicy::BlockingWithTimeout`] a `Pending` source is retried
//! until the timeout; only the final empty attempt turns into `Finished`.

use std::sync::Arc;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tokio::sync::watch;
use tokio::time::Instant;

use super::config::{ReadPolicy, RelayConfig};
use super::format::PcmFormat;
use super::stats::RelayStats;
use crate::error::{Error, Result};
use crate::registry::{StreamHandle, StreamKey};
use crate::source::ReadOutcome;

/// Result of a single pull
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PullResult {
    /// PCM bytes in the adapter's output format (never empty)
    Audio(Bytes),
    /// Nothing available yet; the stream is still live
    Pending,
    /// The stream has ended; the host should stop the channel
    Finished,
}

impl PullResult {
    /// Number of audio bytes carried
    pub fn len(&self) -> usize {
        match self {
            PullResult::Audio(bytes) => bytes.len(),
            PullResult::Pending | PullResult::Finished => 0,
        }
    }

    /// Whether no audio bytes are carried
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether this result terminates the stream
    pub fn is_finished(&self) -> bool {
        matches!(self, PullResult::Finished)
    }

    /// Audio bytes, empty for `Pending` and `Finished`
    pub fn into_bytes(self) -> Bytes {
        match self {
            PullResult::Audio(bytes) => bytes,
            PullResult::Pending | PullResult::Finished => Bytes::new(),
        }
    }
}

/// Adapter lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AdapterState {
    /// Reading
    Open,
    /// End of stream reported, handle released
    Finished,
    /// Closed by the host or by an interrupt
    Closed,
}

/// Cancels a blocking read from another task or thread
///
/// Interrupting closes the adapter; the pending read returns
/// [`Error::Interrupted`].
#[derive(Debug, Clone)]
pub struct Interrupter {
    tx: Arc<watch::Sender<bool>>,
}

impl Interrupter {
    /// Interrupt the current and any future blocking wait
    pub fn interrupt(&self) {
        self.tx.send_replace(true);
    }

    /// Whether an interrupt has been requested
    pub fn is_interrupted(&self) -> bool {
        *self.tx.borrow()
    }
}

/// PCM relay over a single stream handle
pub struct PullAdapter {
    handle: StreamHandle,
    format: PcmFormat,
    policy: ReadPolicy,
    max_read: Option<usize>,
    state: AdapterState,
    interrupt: Arc<watch::Sender<bool>>,
    stats: RelayStats,
}

impl PullAdapter {
    /// Wrap a handle, taking exclusive read ownership of it
    ///
    /// Fails if the handle is closed or another adapter already reads it.
    pub fn new(handle: StreamHandle, config: &RelayConfig) -> Result<Self> {
        handle.claim()?;

        let (interrupt, _) = watch::channel(false);
        let max_read = config.max_read_bytes();

        tracing::info!(
            stream = %handle.key(),
            sample_rate = config.sample_rate,
            max_read = ?max_read,
            policy = ?config.policy,
            "Pull adapter opened"
        );

        Ok(Self {
            handle,
            format: config.format(),
            policy: config.policy,
            max_read,
            state: AdapterState::Open,
            interrupt: Arc::new(interrupt),
            stats: RelayStats::new(),
        })
    }

    /// Output format; fixed for the adapter's lifetime
    pub fn format(&self) -> PcmFormat {
        self.format
    }

    /// Key of the wrapped stream
    pub fn key(&self) -> &StreamKey {
        self.handle.key()
    }

    /// Read policy in effect
    pub fn policy(&self) -> ReadPolicy {
        self.policy
    }

    /// Per-read byte cap, if any
    pub fn max_read_bytes(&self) -> Option<usize> {
        self.max_read
    }

    /// Read statistics
    pub fn stats(&self) -> &RelayStats {
        &self.stats
    }

    /// Whether end of stream has been reported
    pub fn is_finished(&self) -> bool {
        self.state == AdapterState::Finished
    }

    /// Whether the adapter has been closed
    pub fn is_closed(&self) -> bool {
        self.state == AdapterState::Closed
    }

    /// Get a handle that can interrupt blocking reads
    pub fn interrupter(&self) -> Interrupter {
        Interrupter {
            tx: Arc::clone(&self.interrupt),
        }
    }

    /// Single non-blocking attempt, regardless of the configured policy
    ///
    /// Usable from threads without a runtime.
    pub fn try_read(&mut self, size: usize) -> Result<PullResult> {
        self.begin_read()?;

        let result = self.attempt(size)?;
        if result == PullResult::Pending {
            self.stats.pending_reads += 1;
        }
        Ok(result)
    }

    /// Read according to the configured policy
    pub async fn read(&mut self, size: usize) -> Result<PullResult> {
        match self.policy {
            ReadPolicy::NonBlocking => self.try_read(size),
            ReadPolicy::BlockingWithTimeout {
                timeout,
                retry_interval,
            } => self.read_blocking(size, timeout, retry_interval).await,
        }
    }

    /// Close the adapter and its handle
    ///
    /// Safe to call repeatedly; only the first call reaches the handle.
    pub fn close(&mut self) -> Result<()> {
        match self.state {
            AdapterState::Closed => Ok(()),
            AdapterState::Finished => {
                self.state = AdapterState::Closed;
                Ok(())
            }
            AdapterState::Open => {
                self.state = AdapterState::Closed;
                self.detach();

                tracing::info!(
                    stream = %self.handle.key(),
                    bytes = self.stats.bytes_relayed,
                    "Pull adapter closed"
                );
                self.handle.close()?;
                Ok(())
            }
        }
    }

    /// Reject reads on a closed adapter and count the rest
    fn begin_read(&mut self) -> Result<()> {
        if self.state == AdapterState::Closed {
            return Err(Error::Closed);
        }
        self.stats.reads += 1;
        Ok(())
    }

    /// One pull from the handle, capped to the request and the latency budget
    fn attempt(&mut self, size: usize) -> Result<PullResult> {
        if self.state == AdapterState::Finished {
            return Ok(PullResult::Finished);
        }

        let (limit, capped) = match self.max_read {
            Some(cap) if cap < size => (cap, true),
            _ => (size, false),
        };
        if limit == 0 {
            return Ok(PullResult::Pending);
        }

        let mut buf = BytesMut::zeroed(limit);
        match self.handle.read(&mut buf) {
            Ok(ReadOutcome::Data(n)) if n > 0 => {
                buf.truncate(n.min(limit));
                self.stats.audio_reads += 1;
                if capped {
                    self.stats.capped_reads += 1;
                }
                self.stats.bytes_relayed += buf.len() as u64;

                tracing::trace!(stream = %self.handle.key(), bytes = buf.len(), "Relayed audio");
                Ok(PullResult::Audio(buf.freeze()))
            }
            Ok(ReadOutcome::Data(_)) | Ok(ReadOutcome::Pending) => Ok(PullResult::Pending),
            Ok(ReadOutcome::EndOfStream) => {
                self.finish();
                Ok(PullResult::Finished)
            }
            Err(e) => {
                self.stats.errors += 1;
                tracing::warn!(stream = %self.handle.key(), error = %e, "Source read failed");
                Err(Error::Io(e))
            }
        }
    }

    async fn read_blocking(
        &mut self,
        size: usize,
        timeout: Duration,
        retry_interval: Duration,
    ) -> Result<PullResult> {
        self.begin_read()?;

        // Nothing to wait for; an empty request must not run into the timeout
        if size == 0 {
            let result = self.attempt(size)?;
            if result == PullResult::Pending {
                self.stats.pending_reads += 1;
            }
            return Ok(result);
        }

        let deadline = Instant::now() + timeout;
        let mut interrupted = self.interrupt.subscribe();
        let mut closed = self.handle.closed_signal();

        loop {
            if *interrupted.borrow_and_update() {
                return Err(self.abort_interrupted());
            }

            match self.attempt(size)? {
                PullResult::Pending => {}
                result => return Ok(result),
            }

            let now = Instant::now();
            if now >= deadline {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(retry_interval.min(deadline - now)) => {}
                _ = interrupted.changed() => {}
                _ = closed.changed() => {}
            }
        }

        if *interrupted.borrow() {
            return Err(self.abort_interrupted());
        }

        match self.attempt(size)? {
            PullResult::Pending => {
                self.stats.pending_reads += 1;
                self.stats.timeouts += 1;
                tracing::warn!(
                    stream = %self.handle.key(),
                    timeout_ms = timeout.as_millis() as u64,
                    "No data before timeout, treating stream as finished"
                );
                self.finish();
                Ok(PullResult::Finished)
            }
            result => Ok(result),
        }
    }

    /// Mark the stream finished and release the handle
    fn finish(&mut self) {
        if self.state != AdapterState::Open {
            return;
        }
        self.state = AdapterState::Finished;

        tracing::info!(
            stream = %self.handle.key(),
            bytes = self.stats.bytes_relayed,
            reads = self.stats.reads,
            closed_externally = self.handle.is_closed(),
            "Stream finished"
        );

        self.detach();
        if let Err(e) = self.handle.close() {
            tracing::warn!(stream = %self.handle.key(), error = %e, "Failed to close finished stream");
        }
    }

    /// Close after an interrupt and build the error to return
    fn abort_interrupted(&mut self) -> Error {
        tracing::warn!(stream = %self.handle.key(), "Blocking read interrupted");

        if let Err(e) = self.close() {
            tracing::warn!(stream = %self.handle.key(), error = %e, "Failed to close interrupted stream");
        }
        Error::Interrupted
    }

    /// Drop the registry entry if it still points at this adapter's handle
    fn detach(&self) {
        if let Some(registry) = self.handle.registry() {
            registry.remove_if_current(self.handle.key(), &self.handle);
        }
    }
}

impl Drop for PullAdapter {
    fn drop(&mut self) {
        if self.state != AdapterState::Open {
            return;
        }

        self.detach();
        if let Err(e) = self.handle.close() {
            tracing::warn!(stream = %self.handle.key(), error = %e, "Failed to close dropped adapter");
        }
    }
}

impl std::fmt::Debug for PullAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PullAdapter")
            .field("stream", self.handle.key())
            .field("format", &self.format)
            .field("policy", &self.policy)
            .field("max_read", &self.max_read)
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio_test::{assert_err, assert_ok};

    use super::*;
    use crate::registry::{RegistryError, StreamRegistry};
    use crate::source::{pipe, ByteSource, PipeConfig};

    enum Step {
        Data(Vec<u8>),
        Pending,
        Fail(io::ErrorKind),
    }

    /// Replays a fixed script, then reports end of stream
    struct ScriptedSource {
        script: VecDeque<Step>,
        reads: Arc<AtomicUsize>,
        closes: Arc<AtomicUsize>,
        fail_close: bool,
    }

    impl ScriptedSource {
        fn new(script: Vec<Step>) -> Self {
            Self {
                script: script.into(),
                reads: Arc::new(AtomicUsize::new(0)),
                closes: Arc::new(AtomicUsize::new(0)),
                fail_close: false,
            }
        }
    }

    impl ByteSource for ScriptedSource {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<ReadOutcome> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            match self.script.pop_front() {
                Some(Step::Data(mut data)) => {
                    let n = buf.len().min(data.len());
                    buf[..n].copy_from_slice(&data[..n]);
                    if n < data.len() {
                        self.script.push_front(Step::Data(data.split_off(n)));
                    }
                    Ok(ReadOutcome::Data(n))
                }
                Some(Step::Pending) => Ok(ReadOutcome::Pending),
                Some(Step::Fail(kind)) => Err(io::Error::new(kind, "scripted failure")),
                None => Ok(ReadOutcome::EndOfStream),
            }
        }

        fn close(&mut self) -> io::Result<()> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            if self.fail_close {
                return Err(io::Error::new(io::ErrorKind::Other, "close failed"));
            }
            Ok(())
        }
    }

    fn key() -> StreamKey {
        StreamKey::new("relay", "test")
    }

    fn adapter(source: impl ByteSource + 'static, config: RelayConfig) -> PullAdapter {
        PullAdapter::new(StreamHandle::new(key(), source), &config).unwrap()
    }

    fn blocking(timeout_ms: u64) -> RelayConfig {
        RelayConfig::new(48_000).policy(ReadPolicy::blocking(Duration::from_millis(timeout_ms)))
    }

    #[test]
    fn test_format_is_fixed_mono_s16le() {
        let adapter = adapter(ScriptedSource::new(vec![]), RelayConfig::new(44_100));

        assert_eq!(adapter.format(), PcmFormat::mono_s16le(44_100));
    }

    #[test]
    fn test_read_capped_by_latency_budget() {
        let source = ScriptedSource::new(vec![Step::Data(vec![1; 100_000])]);
        let mut adapter = adapter(source, RelayConfig::new(48_000));

        let result = adapter.try_read(100_000).unwrap();

        assert_eq!(result.len(), 4_800);
        assert_eq!(adapter.stats().capped_reads, 1);
    }

    #[test]
    fn test_read_capped_by_requested_size() {
        let source = ScriptedSource::new(vec![Step::Data(vec![1; 100])]);
        let mut adapter = adapter(source, RelayConfig::new(48_000));

        assert_eq!(adapter.try_read(10).unwrap().len(), 10);
        assert_eq!(adapter.try_read(1_000).unwrap().len(), 90);
        assert_eq!(adapter.stats().capped_reads, 0);
    }

    #[test]
    fn test_uncapped_read() {
        let source = ScriptedSource::new(vec![Step::Data(vec![1; 100_000])]);
        let mut adapter = adapter(source, RelayConfig::new(48_000).no_latency_cap());

        assert_eq!(adapter.try_read(100_000).unwrap().len(), 100_000);
    }

    #[test]
    fn test_pending_is_not_terminal() {
        let source = ScriptedSource::new(vec![
            Step::Pending,
            Step::Pending,
            Step::Data(vec![3, 4]),
            Step::Pending,
        ]);
        let mut adapter = adapter(source, RelayConfig::default());

        assert_eq!(adapter.try_read(64).unwrap(), PullResult::Pending);
        assert_eq!(adapter.try_read(64).unwrap(), PullResult::Pending);
        assert!(!adapter.is_finished());

        assert_eq!(
            adapter.try_read(64).unwrap(),
            PullResult::Audio(Bytes::from_static(&[3, 4]))
        );
        assert_eq!(adapter.try_read(64).unwrap(), PullResult::Pending);
        assert_eq!(adapter.stats().pending_reads, 3);
    }

    #[test]
    fn test_end_of_stream_reported_then_noop() {
        let source = ScriptedSource::new(vec![Step::Data(vec![1, 2])]);
        let reads = Arc::clone(&source.reads);
        let closes = Arc::clone(&source.closes);
        let mut adapter = adapter(source, RelayConfig::default());

        assert_eq!(adapter.try_read(64).unwrap().len(), 2);
        assert_eq!(adapter.try_read(64).unwrap(), PullResult::Finished);
        assert!(adapter.is_finished());
        assert_eq!(closes.load(Ordering::SeqCst), 1);

        // Later reads do not touch the source
        let reads_at_end = reads.load(Ordering::SeqCst);
        assert_eq!(adapter.try_read(64).unwrap(), PullResult::Finished);
        assert_eq!(adapter.try_read(64).unwrap(), PullResult::Finished);
        assert_eq!(reads.load(Ordering::SeqCst), reads_at_end);
    }

    #[test]
    fn test_io_error_is_propagated() {
        let source = ScriptedSource::new(vec![
            Step::Fail(io::ErrorKind::ConnectionReset),
            Step::Data(vec![5]),
        ]);
        let mut adapter = adapter(source, RelayConfig::default());

        let err = adapter.try_read(64).unwrap_err();
        assert!(matches!(err, Error::Io(ref e) if e.kind() == io::ErrorKind::ConnectionReset));
        assert_eq!(adapter.stats().errors, 1);

        // Neither terminal nor closed
        assert!(!adapter.is_finished());
        assert!(!adapter.is_closed());
        assert_eq!(adapter.try_read(64).unwrap().len(), 1);
    }

    #[test]
    fn test_close_is_idempotent() {
        let source = ScriptedSource::new(vec![Step::Pending]);
        let closes = Arc::clone(&source.closes);
        let mut adapter = adapter(source, RelayConfig::default());

        assert_ok!(adapter.close());
        assert_ok!(adapter.close());

        assert_eq!(closes.load(Ordering::SeqCst), 1);
        assert!(matches!(adapter.try_read(64), Err(Error::Closed)));
    }

    #[test]
    fn test_close_after_finish() {
        let source = ScriptedSource::new(vec![]);
        let closes = Arc::clone(&source.closes);
        let mut adapter = adapter(source, RelayConfig::default());

        assert!(adapter.try_read(64).unwrap().is_finished());
        assert_ok!(adapter.close());

        assert!(adapter.is_closed());
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_close_failure_is_propagated() {
        let mut source = ScriptedSource::new(vec![Step::Pending]);
        source.fail_close = true;
        let mut adapter = adapter(source, RelayConfig::default());

        assert!(matches!(adapter.close(), Err(Error::Io(_))));
        // The handle counts as released; a second close is quiet
        assert_ok!(adapter.close());
    }

    #[test]
    fn test_drop_closes_handle() {
        let source = ScriptedSource::new(vec![Step::Pending]);
        let closes = Arc::clone(&source.closes);
        let handle = StreamHandle::new(key(), source);

        let adapter = PullAdapter::new(handle.clone(), &RelayConfig::default()).unwrap();
        drop(adapter);

        assert!(handle.is_closed());
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_handle_claimed_once() {
        let handle = StreamHandle::new(key(), ScriptedSource::new(vec![]));

        let _first = PullAdapter::new(handle.clone(), &RelayConfig::default()).unwrap();
        let second = PullAdapter::new(handle, &RelayConfig::default());

        assert!(matches!(
            second,
            Err(Error::Registry(RegistryError::AlreadyClaimed(_)))
        ));
    }

    #[test]
    fn test_finish_removes_registry_entry() {
        let registry = Arc::new(StreamRegistry::new());
        let (writer, reader) = pipe(PipeConfig::default());
        registry.register_source(key(), reader).unwrap();
        writer.finish();

        let mut adapter = registry.open(&key(), &RelayConfig::default()).unwrap();
        assert!(adapter.try_read(64).unwrap().is_finished());

        assert!(!registry.contains(&key()));
    }

    #[test]
    fn test_close_keeps_replacement_registered() {
        let registry = Arc::new(StreamRegistry::new());
        let (_w1, r1) = pipe(PipeConfig::default());
        let (_w2, r2) = pipe(PipeConfig::default());
        registry.register_source(key(), r1).unwrap();

        let mut adapter = registry.open(&key(), &RelayConfig::default()).unwrap();
        let replacement = registry.register_source(key(), r2).unwrap();

        // Replacement closed the old handle; the adapter sees the end
        assert!(adapter.try_read(64).unwrap().is_finished());
        assert_ok!(adapter.close());

        assert!(registry.lookup(&key()).unwrap().same_stream(&replacement));
    }

    #[tokio::test]
    async fn test_nonblocking_read_does_not_wait() {
        let mut adapter = adapter(ScriptedSource::new(vec![Step::Pending]), RelayConfig::default());

        assert_eq!(adapter.read(64).await.unwrap(), PullResult::Pending);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blocking_read_waits_for_late_data() {
        let (writer, reader) = pipe(PipeConfig::default());
        let mut adapter = adapter(reader, blocking(2_000));

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            writer.write(&[0x10, 0x20]).await.unwrap();
            // Keep the stream open
            tokio::time::sleep(Duration::from_secs(60)).await;
        });

        let start = Instant::now();
        let result = adapter.read(64).await.unwrap();

        assert_eq!(result, PullResult::Audio(Bytes::from_static(&[0x10, 0x20])));
        assert!(start.elapsed() >= Duration::from_millis(500));
        assert!(start.elapsed() < Duration::from_millis(2_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_blocking_read_times_out_at_boundary() {
        let (_writer, reader) = pipe(PipeConfig::default());
        let mut adapter = adapter(reader, blocking(2_000));

        let start = Instant::now();
        let result = adapter.read(64).await.unwrap();

        assert_eq!(result, PullResult::Finished);
        assert!(start.elapsed() >= Duration::from_millis(2_000));
        assert_eq!(adapter.stats().timeouts, 1);
        assert!(adapter.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn test_blocking_read_ends_early_on_end_of_stream() {
        let (writer, reader) = pipe(PipeConfig::default());
        let mut adapter = adapter(reader, blocking(2_000));

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            writer.finish();
        });

        let start = Instant::now();
        assert_eq!(adapter.read(64).await.unwrap(), PullResult::Finished);
        assert!(start.elapsed() < Duration::from_millis(2_000));
        assert_eq!(adapter.stats().timeouts, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unregister_unblocks_blocking_read() {
        let registry = Arc::new(StreamRegistry::new());
        let (_writer, reader) = pipe(PipeConfig::default());
        registry.register_source(key(), reader).unwrap();
        let mut adapter = registry.open(&key(), &blocking(10_000)).unwrap();

        let remover = Arc::clone(&registry);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            remover.unregister(&key()).unwrap();
        });

        let start = Instant::now();
        assert_eq!(adapter.read(64).await.unwrap(), PullResult::Finished);
        assert!(start.elapsed() < Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_interrupt_closes_and_errors() {
        let (writer, reader) = pipe(PipeConfig::default());
        let mut adapter = adapter(reader, blocking(10_000));
        let interrupter = adapter.interrupter();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            interrupter.interrupt();
        });

        let result = adapter.read(64).await;

        assert!(matches!(result, Err(Error::Interrupted)));
        assert!(adapter.is_closed());
        assert!(writer.is_reader_closed());
        assert_err!(adapter.read(64).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blocking_read_is_capped() {
        let (writer, reader) = pipe(PipeConfig::default());
        writer.write(&[7; 20_000]).await.unwrap();
        let mut adapter = adapter(reader, blocking(2_000));

        assert_eq!(adapter.read(100_000).await.unwrap().len(), 4_800);
        assert_eq!(adapter.read(100).await.unwrap().len(), 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blocking_zero_size_read_returns_immediately() {
        let (writer, reader) = pipe(PipeConfig::default());
        writer.write(&[3; 100]).await.unwrap();
        let mut adapter = adapter(reader, blocking(2_000));

        let start = Instant::now();
        assert_eq!(adapter.read(0).await.unwrap(), PullResult::Pending);
        assert_eq!(start.elapsed(), Duration::ZERO);

        assert!(!adapter.is_finished());
        assert!(!writer.is_reader_closed());
        assert_eq!(adapter.stats().timeouts, 0);

        // Buffered audio is still there
        assert_eq!(adapter.read(64).await.unwrap().len(), 64);
    }

    #[tokio::test]
    async fn test_blocking_zero_size_read_after_finish() {
        let mut adapter = adapter(ScriptedSource::new(vec![]), blocking(2_000));

        assert!(adapter.try_read(64).unwrap().is_finished());
        assert_eq!(adapter.read(0).await.unwrap(), PullResult::Finished);
    }
}
