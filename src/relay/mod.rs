//! Pull-side relay for the host playback engine
//!
//! The host engine pulls PCM from a [`PullAdapter`] on its own thread, in
//! chunks of whatever size it likes. The adapter bounds every chunk by the
//! request and by the latency cap, and distinguishes "nothing yet" from "the
//! stream is over" so a slow producer never stops the channel early.
//!
//! ```text
//!  StreamHandle ──► PullAdapter ──► read(size) ──► PullResult
//!                     │  format: mono s16le @ sample_rate
//!                     │  cap:    sample_rate × 50ms (whole frames)
//!                     └─ policy: NonBlocking | BlockingWithTimeout
//! ```

pub mod adapter;
pub mod config;
pub mod format;
pub mod stats;

pub use adapter::{Interrupter, PullAdapter, PullResult};
pub use config::{
    ReadPolicy, RelayConfig, DEFAULT_BLOCKING_TIMEOUT, DEFAULT_LATENCY_CAP, DEFAULT_RETRY_INTERVAL,
    DEFAULT_SAMPLE_RATE,
};
pub use format::{ByteOrder, PcmFormat};
pub use stats::RelayStats;
