//! Byte sources feeding the relay
//!
//! A byte source is the producer-owned end of a stream: something that fills
//! up over time (network fetch, decoder output) and is drained by the relay.
//!
//! # Three-way read outcome
//!
//! ```text
//!   read(buf) ──► Data(n)      n > 0 bytes copied into buf
//!             ├─► Pending      nothing buffered yet, producer still running
//!             └─► EndOfStream  producer finished, nothing will ever arrive
//! ```
//!
//! `Pending` and `EndOfStream` both copy zero bytes. They must never be
//! conflated: a relay that treats `Pending` as the end stops the playback
//! channel in the middle of a track.

pub mod pipe;

use std::io;

pub use pipe::{pipe, PipeConfig, PipeMonitor, StreamReader, StreamWriter};

/// Outcome of a single read from a [`ByteSource`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// `n` bytes were copied into the buffer (always `0 < n <= buf.len()`)
    Data(usize),
    /// No bytes are available right now; the stream is still open
    Pending,
    /// The producer finished; no further bytes will arrive
    EndOfStream,
}

impl ReadOutcome {
    /// Number of bytes copied by this read
    pub fn len(&self) -> usize {
        match self {
            ReadOutcome::Data(n) => *n,
            ReadOutcome::Pending | ReadOutcome::EndOfStream => 0,
        }
    }

    /// Whether no bytes were copied
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether this outcome ends the stream
    pub fn is_end(&self) -> bool {
        matches!(self, ReadOutcome::EndOfStream)
    }
}

/// A sequential, non-blocking byte source
///
/// Implementations must return promptly from `read`; waiting for data is the
/// relay's job, not the source's.
pub trait ByteSource: Send {
    /// Copy up to `buf.len()` bytes into `buf`
    fn read(&mut self, buf: &mut [u8]) -> io::Result<ReadOutcome>;

    /// Release the source. Called at most once by [`StreamHandle`](crate::registry::StreamHandle).
    fn close(&mut self) -> io::Result<()>;
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<ReadOutcome> {
        (**self).read(buf)
    }

    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}
