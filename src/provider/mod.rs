//! Provider chain
//!
//! The host playback engine resolves a sound by identifier. Before falling
//! back to its own loading it asks a [`ProviderChain`]: each
//! [`StreamProvider`] is tried in order and the first one that returns a
//! handle wins.
//!
//! ```text
//!   "relay:sounds/jukebox/3f2a.ogg"
//!        │ StreamKey::from_engine_path
//!        ▼
//!   relay:jukebox/3f2a ──► provider 1 ──None──► provider 2 ──Some(h)──► PullAdapter
//!                                                     │
//!                                   all None ──► Ok(None), engine loads normally
//! ```
//!
//! Adapter construction can be moved off the caller's thread with
//! [`ProviderChain::spawn_open`].

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::error::{Error, Result};
use crate::registry::{StreamHandle, StreamKey, StreamRegistry};
use crate::relay::{PullAdapter, RelayConfig};

/// Something that may supply a stream for a key
///
/// Implementations run synchronously and may be called from any thread.
pub trait StreamProvider: Send + Sync {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Return a handle for `key`, or `None` to let the next provider try
    fn provide(&self, key: &StreamKey) -> Result<Option<StreamHandle>>;
}

/// Serves streams registered in a [`StreamRegistry`]
pub struct RegistryProvider {
    registry: Arc<StreamRegistry>,
    namespace: Option<String>,
}

impl RegistryProvider {
    pub fn new(registry: Arc<StreamRegistry>) -> Self {
        Self {
            registry,
            namespace: None,
        }
    }

    /// Only answer for keys in `namespace`
    pub fn only_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }
}

impl StreamProvider for RegistryProvider {
    fn name(&self) -> &str {
        "registry"
    }

    fn provide(&self, key: &StreamKey) -> Result<Option<StreamHandle>> {
        if let Some(namespace) = &self.namespace {
            if key.namespace != *namespace {
                return Ok(None);
            }
        }
        Ok(self.registry.lookup(key))
    }
}

/// Provider backed by a closure
pub struct FnProvider<F> {
    name: String,
    provide: F,
}

impl<F> FnProvider<F>
where
    F: Fn(&StreamKey) -> Result<Option<StreamHandle>> + Send + Sync,
{
    pub fn new(name: impl Into<String>, provide: F) -> Self {
        Self {
            name: name.into(),
            provide,
        }
    }
}

impl<F> StreamProvider for FnProvider<F>
where
    F: Fn(&StreamKey) -> Result<Option<StreamHandle>> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn provide(&self, key: &StreamKey) -> Result<Option<StreamHandle>> {
        (self.provide)(key)
    }
}

/// Ordered list of providers consulted before the engine's default loading
#[derive(Default, Clone)]
pub struct ProviderChain {
    providers: Vec<Arc<dyn StreamProvider>>,
}

impl ProviderChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a provider
    pub fn with(mut self, provider: impl StreamProvider + 'static) -> Self {
        self.providers.push(Arc::new(provider));
        self
    }

    /// Append a shared provider
    pub fn push(&mut self, provider: Arc<dyn StreamProvider>) {
        self.providers.push(provider);
    }

    /// Number of providers
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Ask each provider in turn for `key`
    ///
    /// A failing provider is skipped so later ones still get a chance. If no
    /// provider supplies a handle, the first failure (if any) is returned.
    pub fn resolve(&self, key: &StreamKey) -> Result<Option<StreamHandle>> {
        let mut first_error = None;

        for provider in &self.providers {
            match provider.provide(key) {
                Ok(Some(handle)) => {
                    tracing::debug!(stream = %key, provider = provider.name(), "Stream provided");
                    return Ok(Some(handle));
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(stream = %key, provider = provider.name(), error = %e, "Provider failed");
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(None),
        }
    }

    /// Open a pull adapter for an engine asset path
    ///
    /// `Ok(None)` means no provider claims the path and the engine should
    /// load it the default way.
    pub fn open(&self, path: &str, config: &RelayConfig) -> Result<Option<PullAdapter>> {
        self.open_key(&StreamKey::from_engine_path(path), config)
    }

    /// Open a pull adapter for an already normalized key
    pub fn open_key(&self, key: &StreamKey, config: &RelayConfig) -> Result<Option<PullAdapter>> {
        match self.resolve(key)? {
            Some(handle) => PullAdapter::new(handle, config).map(Some),
            None => Ok(None),
        }
    }

    /// Build the adapter on the blocking pool
    ///
    /// Providers are synchronous and may do slow work (starting a fetch,
    /// spawning a decoder), so this keeps it off the caller's thread.
    pub fn spawn_open(
        self: &Arc<Self>,
        path: impl Into<String>,
        config: RelayConfig,
    ) -> JoinHandle<Result<Option<PullAdapter>>> {
        let chain = Arc::clone(self);
        let path = path.into();

        tokio::task::spawn_blocking(move || chain.open(&path, &config))
    }

    /// [`spawn_open`](Self::spawn_open) and wait for the result
    pub async fn open_in_background(
        self: &Arc<Self>,
        path: impl Into<String>,
        config: RelayConfig,
    ) -> Result<Option<PullAdapter>> {
        self.spawn_open(path, config).await.map_err(Error::from)?
    }
}

impl std::fmt::Debug for ProviderChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.providers.iter().map(|p| p.name()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::registry::RegistryError;
    use crate::relay::PullResult;
    use crate::source::{pipe, PipeConfig};

    fn registry_with(key: &str) -> (Arc<StreamRegistry>, crate::source::StreamWriter) {
        let registry = Arc::new(StreamRegistry::new());
        let (writer, reader) = pipe(PipeConfig::default());
        registry.register_source(StreamKey::parse(key), reader).unwrap();
        (registry, writer)
    }

    #[test]
    fn test_open_engine_path() {
        let (registry, writer) = registry_with("relay:jukebox/3f2a");
        writer.try_write(&[1, 2, 3, 4]).unwrap();
        let chain = ProviderChain::new().with(RegistryProvider::new(registry));

        let mut adapter = chain
            .open("relay:sounds/jukebox/3f2a.ogg", &RelayConfig::default())
            .unwrap()
            .unwrap();

        assert_eq!(adapter.key(), &StreamKey::new("relay", "jukebox/3f2a"));
        assert_eq!(adapter.try_read(64).unwrap().len(), 4);
    }

    #[test]
    fn test_unknown_path_falls_back() {
        let (registry, _writer) = registry_with("relay:a");
        let chain = ProviderChain::new().with(RegistryProvider::new(registry));

        let result = chain.open("relay:sounds/b.ogg", &RelayConfig::default()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_namespace_filter() {
        let (registry, _writer) = registry_with("other:a");
        let chain = ProviderChain::new()
            .with(RegistryProvider::new(Arc::clone(&registry)).only_namespace("relay"));

        assert!(chain.resolve(&StreamKey::parse("other:a")).unwrap().is_none());
        assert!(registry.contains(&StreamKey::parse("other:a")));
    }

    #[test]
    fn test_first_provider_wins() {
        let (registry, _writer) = registry_with("relay:a");
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let chain = ProviderChain::new()
            .with(RegistryProvider::new(registry))
            .with(FnProvider::new("counting", move |_key: &StreamKey| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(None)
            }));

        assert!(chain.resolve(&StreamKey::parse("relay:a")).unwrap().is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert!(chain.resolve(&StreamKey::parse("relay:b")).unwrap().is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failing_provider_is_skipped() {
        let (registry, _writer) = registry_with("relay:a");
        let chain = ProviderChain::new()
            .with(FnProvider::new("broken", |_key: &StreamKey| {
                Err(io::Error::new(io::ErrorKind::Other, "backend down").into())
            }))
            .with(RegistryProvider::new(registry));

        assert!(chain.resolve(&StreamKey::parse("relay:a")).unwrap().is_some());

        let err = chain.resolve(&StreamKey::parse("relay:b")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_empty_chain() {
        let chain = ProviderChain::new();

        assert!(chain.is_empty());
        assert!(chain.resolve(&StreamKey::parse("relay:a")).unwrap().is_none());
    }

    #[test]
    fn test_open_claimed_stream_fails() {
        let (registry, _writer) = registry_with("relay:a");
        let chain = ProviderChain::new().with(RegistryProvider::new(registry));

        let _first = chain.open("relay:a", &RelayConfig::default()).unwrap();
        let second = chain.open("relay:a", &RelayConfig::default());

        assert!(matches!(
            second,
            Err(Error::Registry(RegistryError::AlreadyClaimed(_)))
        ));
    }

    #[tokio::test]
    async fn test_spawn_open() {
        let (registry, writer) = registry_with("relay:song");
        let chain = Arc::new(ProviderChain::new().with(RegistryProvider::new(registry)));

        let mut adapter = chain
            .spawn_open("relay:sounds/song.ogg", RelayConfig::default())
            .await
            .unwrap()
            .unwrap()
            .unwrap();

        writer.write(&[5; 8]).await.unwrap();
        writer.finish();

        assert_eq!(adapter.read(64).await.unwrap().len(), 8);
        assert_eq!(adapter.read(64).await.unwrap(), PullResult::Finished);
    }

    #[tokio::test]
    async fn test_open_in_background_propagates_errors() {
        let chain = Arc::new(ProviderChain::new().with(FnProvider::new(
            "broken",
            |key: &StreamKey| Err(RegistryError::StreamClosed(key.clone()).into()),
        )));

        let result = chain
            .open_in_background("relay:a", RelayConfig::default())
            .await;

        assert!(matches!(
            result,
            Err(Error::Registry(RegistryError::StreamClosed(_)))
        ));
    }
}
