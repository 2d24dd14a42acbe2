//! PCM relay demo
//!
//! Run with: cargo run --example relay_demo [SECONDS]
//!
//! A producer task synthesizes a 440Hz tone and writes it into a pipe in
//! bursts with short stalls, the way a network fetch behaves. A simulated
//! playback engine resolves the stream through a provider chain using the
//! engine's asset path form and pulls it with the blocking read policy.
//!
//! Set `RUST_LOG=pcm_relay=trace` to see every relayed chunk. Press Ctrl+C to
//! interrupt playback.

use std::f32::consts::PI;
use std::sync::Arc;
use std::time::Duration;

use pcm_relay::relay::DEFAULT_BLOCKING_TIMEOUT;
use pcm_relay::{
    pipe, PcmFormat, PipeConfig, ProviderChain, PullResult, ReadPolicy, RegistryProvider,
    RelayConfig, StreamKey, StreamRegistry, StreamWriter,
};

const SAMPLE_RATE: u32 = 48_000;
const TONE_HZ: f32 = 440.0;

/// Render `samples` of a sine tone as 16-bit little-endian PCM
fn tone(start: usize, samples: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples * 2);
    for n in start..start + samples {
        let t = n as f32 / SAMPLE_RATE as f32;
        let sample = ((2.0 * PI * TONE_HZ * t).sin() * i16::MAX as f32 * 0.25) as i16;
        out.extend_from_slice(&sample.to_le_bytes());
    }
    out
}

async fn produce(writer: StreamWriter, seconds: u64) -> std::io::Result<()> {
    let total = SAMPLE_RATE as usize * seconds as usize;
    let burst = SAMPLE_RATE as usize / 5; // 200ms of audio per burst
    let mut written = 0;

    while written < total {
        let samples = burst.min(total - written);
        writer.write(&tone(written, samples)).await?;
        written += samples;

        // Every second burst, stall like a slow fetch
        if (written / burst) % 2 == 0 {
            tokio::time::sleep(Duration::from_millis(250)).await;
        }
    }

    tracing::info!(samples = written, "Producer done");
    writer.finish();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let seconds: u64 = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => 3,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pcm_relay=debug".parse()?)
                .add_directive("relay_demo=debug".parse()?),
        )
        .init();

    let registry = Arc::new(StreamRegistry::new());

    // Producer side: register before the first byte exists
    let format = PcmFormat::mono_s16le(SAMPLE_RATE);
    let (writer, reader) = pipe(PipeConfig::buffered(&format, Duration::from_secs(1)));
    let monitor = writer.monitor();
    registry.register_source(StreamKey::parse("relay:jukebox/tone"), reader)?;
    let producer = tokio::spawn(produce(writer, seconds));

    // Playback side: resolve by asset path, build the adapter off-thread
    let chain = Arc::new(ProviderChain::new().with(RegistryProvider::new(Arc::clone(&registry))));
    let config = RelayConfig::new(SAMPLE_RATE).policy(ReadPolicy::blocking(DEFAULT_BLOCKING_TIMEOUT));

    let Some(mut adapter) = chain
        .open_in_background("relay:sounds/jukebox/tone.ogg", config)
        .await?
    else {
        tracing::error!("No provider claimed the stream");
        return Ok(());
    };

    if !monitor.wait_prebuffered(Duration::from_secs(30)).await? {
        tracing::warn!("Starting playback before pre-buffer filled");
    }

    let interrupter = adapter.interrupter();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupter.interrupt();
        }
    });

    // Engine loop: pull a 4096-byte chunk every 10ms
    let mut ticker = tokio::time::interval(Duration::from_millis(10));
    loop {
        ticker.tick().await;
        match adapter.read(4_096).await {
            Ok(PullResult::Audio(pcm)) => {
                tracing::trace!(bytes = pcm.len(), "Rendered chunk");
            }
            Ok(PullResult::Pending) => {}
            Ok(PullResult::Finished) => break,
            Err(e) => {
                tracing::error!(error = %e, "Playback stopped");
                break;
            }
        }
    }

    let stats = adapter.stats();
    tracing::info!(
        audio_ms = stats.audio_relayed(&adapter.format()).as_millis() as u64,
        reads = stats.reads,
        capped = stats.capped_reads,
        timeouts = stats.timeouts,
        starvation = format!("{:.1}%", stats.starvation_ratio() * 100.0),
        "Playback finished"
    );

    if let Err(e) = producer.await? {
        tracing::warn!(error = %e, "Producer stopped early");
    }
    registry.clear();

    Ok(())
}
