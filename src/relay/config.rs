//! Relay configuration

use std::time::Duration;

use super::format::PcmFormat;

/// Default output sample rate
pub const DEFAULT_SAMPLE_RATE: u32 = 48_000;

/// Default per-read latency budget
pub const DEFAULT_LATENCY_CAP: Duration = Duration::from_millis(50);

/// Default overall wait for the blocking policy
pub const DEFAULT_BLOCKING_TIMEOUT: Duration = Duration::from_millis(2_000);

/// Default retry interval for the blocking policy
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(5);

/// How a read reacts when the source has nothing buffered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadPolicy {
    /// One attempt per read. An empty source yields `PullResult::Pending`
    /// and the host is expected to call again.
    #[default]
    NonBlocking,

    /// Retry every `retry_interval` until data arrives, the stream ends, or
    /// `timeout` elapses.
    ///
    /// On timeout the read makes one last attempt and then reports the
    /// stream as finished. A producer that stalls for longer than `timeout`
    /// is therefore indistinguishable from one that completed, and playback
    /// is cut short.
    BlockingWithTimeout {
        timeout: Duration,
        retry_interval: Duration,
    },
}

impl ReadPolicy {
    /// Blocking policy with the default retry interval
    pub fn blocking(timeout: Duration) -> Self {
        ReadPolicy::BlockingWithTimeout {
            timeout,
            retry_interval: DEFAULT_RETRY_INTERVAL,
        }
    }

    /// Whether reads under this policy may wait
    pub fn is_blocking(&self) -> bool {
        matches!(self, ReadPolicy::BlockingWithTimeout { .. })
    }
}

/// Pull adapter configuration
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Output sample rate
    pub sample_rate: u32,

    /// Read policy
    pub policy: ReadPolicy,

    /// Maximum audio returned by a single read (None = uncapped)
    pub latency_cap: Option<Duration>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            policy: ReadPolicy::NonBlocking,
            latency_cap: Some(DEFAULT_LATENCY_CAP),
        }
    }
}

impl RelayConfig {
    /// Create a config for the given sample rate
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            ..Default::default()
        }
    }

    /// Set the read policy
    pub fn policy(mut self, policy: ReadPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Cap each read to `millis` of audio
    pub fn latency_cap_millis(mut self, millis: u64) -> Self {
        self.latency_cap = Some(Duration::from_millis(millis));
        self
    }

    /// Remove the per-read cap
    pub fn no_latency_cap(mut self) -> Self {
        self.latency_cap = None;
        self
    }

    /// Output format for this config
    pub fn format(&self) -> PcmFormat {
        PcmFormat::mono_s16le(self.sample_rate)
    }

    /// Maximum bytes per read derived from the latency cap
    ///
    /// Always a whole number of frames and at least one frame, so a read
    /// never splits a sample.
    pub fn max_read_bytes(&self) -> Option<usize> {
        let format = self.format();
        self.latency_cap
            .map(|cap| format.bytes_for(cap).max(format.frame_size()))
    }
}
