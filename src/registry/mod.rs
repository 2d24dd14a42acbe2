//! Stream registry for producer/relay hand-off
//!
//! Producers register a [`StreamHandle`] under a [`StreamKey`]; the playback
//! side looks it up by the same key and reads it through a
//! [`PullAdapter`](crate::relay::PullAdapter).
//!
//! # Architecture
//!
//! ```text
//!                          Arc<StreamRegistry>
//!                     ┌─────────────────────────┐
//!                     │ streams: HashMap<Key,   │
//!                     │   StreamHandle {        │
//!                     │     source,             │
//!                     │     closed: watch::Tx,  │
//!                     │   }                     │
//!                     │ >                       │
//!                     └───────────┬─────────────┘
//!                                 │
//!         ┌───────────────────────┴───────────────────────┐
//!         │                                               │
//!         ▼                                               ▼
//!    [Producer]                                      [Playback engine]
//!    register_source()                               open() ──► PullAdapter
//!    StreamWriter::write() ──► pipe ──► StreamReader ──► read() ──► host
//! ```
//!
//! # Replacement
//!
//! Registering a second handle under a key that is already taken replaces the
//! old entry and closes the old handle, so a reader still holding it sees the
//! end of its stream. Set [`RegistryConfig::replace_existing`] to `false` to
//! reject the registration instead.

pub mod config;
pub mod error;
pub mod handle;
pub mod key;
pub mod store;

pub use config::RegistryConfig;
pub use error::RegistryError;
pub use handle::StreamHandle;
pub use key::{StreamKey, DEFAULT_NAMESPACE};
pub use store::StreamRegistry;
