//! Statistics for a relay session

use std::time::{Duration, Instant};

use super::format::PcmFormat;

/// Per-adapter read statistics
#[derive(Debug, Clone)]
pub struct RelayStats {
    /// When the adapter was created
    pub started_at: Instant,
    /// Read calls made by the host
    pub reads: u64,
    /// Reads that returned audio
    pub audio_reads: u64,
    /// Reads that found nothing buffered yet
    pub pending_reads: u64,
    /// Reads whose request was cut down by the latency cap
    pub capped_reads: u64,
    /// Blocking reads that gave up at the timeout boundary
    pub timeouts: u64,
    /// Reads that failed with an I/O error
    pub errors: u64,
    /// Total bytes handed to the host
    pub bytes_relayed: u64,
}

impl RelayStats {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            reads: 0,
            audio_reads: 0,
            pending_reads: 0,
            capped_reads: 0,
            timeouts: 0,
            errors: 0,
            bytes_relayed: 0,
        }
    }

    /// Get duration since the adapter was created
    pub fn duration(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Playback time relayed so far
    pub fn audio_relayed(&self, format: &PcmFormat) -> Duration {
        format.duration_of(self.bytes_relayed)
    }

    /// Fraction of reads that found the source empty
    pub fn starvation_ratio(&self) -> f64 {
        if self.reads > 0 {
            self.pending_reads as f64 / self.reads as f64
        } else {
            0.0
        }
    }
}

impl Default for RelayStats {
    fn default() -> Self {
        Self::new()
    }
}
