//! Output audio format

use std::time::Duration;

/// Byte order of multi-byte samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    LittleEndian,
    BigEndian,
}

/// PCM format descriptor handed to the playback engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    /// Samples per second per channel
    pub sample_rate: u32,
    /// Bits per sample
    pub bits_per_sample: u16,
    /// Number of interleaved channels
    pub channels: u16,
    /// Whether samples are signed
    pub signed: bool,
    /// Sample byte order
    pub byte_order: ByteOrder,
}

impl PcmFormat {
    /// 16-bit signed little-endian mono at the given rate
    pub fn mono_s16le(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            bits_per_sample: 16,
            channels: 1,
            signed: true,
            byte_order: ByteOrder::LittleEndian,
        }
    }

    /// Bytes per single-channel sample
    pub fn bytes_per_sample(&self) -> usize {
        (self.bits_per_sample as usize).div_ceil(8)
    }

    /// Bytes per frame (one sample for every channel)
    pub fn frame_size(&self) -> usize {
        self.bytes_per_sample() * self.channels as usize
    }

    /// Bytes of audio per second
    pub fn byte_rate(&self) -> usize {
        self.frame_size() * self.sample_rate as usize
    }

    /// Whole frames' worth of bytes covering `duration`, rounded down
    pub fn bytes_for(&self, duration: Duration) -> usize {
        let frames = duration.as_micros() * self.sample_rate as u128 / 1_000_000;
        frames as usize * self.frame_size()
    }

    /// Playback time represented by `bytes`
    pub fn duration_of(&self, bytes: u64) -> Duration {
        let rate = self.byte_rate() as u64;
        if rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_micros(bytes * 1_000_000 / rate)
    }
}
