//! pcm-relay: pull-based PCM relay for real-time audio playback
//!
//! Producers (network fetchers, decoders) push PCM bytes into a stream and
//! register it under a key. A playback engine running on its own thread looks
//! the key up and pulls small, latency-bounded chunks through a
//! [`PullAdapter`], which tells "no data yet" apart from "stream over".
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use pcm_relay::{pipe, PipeConfig, PullResult, RelayConfig, StreamKey, StreamRegistry};
//!
//! #[tokio::main]
//! async fn main() -> pcm_relay::Result<()> {
//!     let registry = Arc::new(StreamRegistry::new());
//!
//!     let (writer, reader) = pipe(PipeConfig::default());
//!     let key = StreamKey::parse("relay:jukebox/3f2a");
//!     registry.register_source(key.clone(), reader)?;
//!
//!     tokio::spawn(async move {
//!         let _ = writer.write(&[0u8; 9_600]).await;
//!         writer.finish();
//!     });
//!
//!     let mut adapter = registry.open(&key, &RelayConfig::new(48_000))?;
//!     loop {
//!         match adapter.read(4_096).await? {
//!             PullResult::Audio(pcm) => { /* hand pcm to the engine */ }
//!             PullResult::Pending => tokio::task::yield_now().await,
//!             PullResult::Finished => break,
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod provider;
pub mod registry;
pub mod relay;
pub mod source;

pub use error::{Error, Result};
pub use provider::{FnProvider, ProviderChain, RegistryProvider, StreamProvider};
pub use registry::{RegistryConfig, RegistryError, StreamHandle, StreamKey, StreamRegistry};
pub use relay::{
    Interrupter, PcmFormat, PullAdapter, PullResult, ReadPolicy, RelayConfig, RelayStats,
};
pub use source::{pipe, ByteSource, PipeConfig, PipeMonitor, ReadOutcome, StreamReader, StreamWriter};
