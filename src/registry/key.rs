//! Stream identifiers
//!
//! Streams are keyed by a namespaced path (`namespace:path`). The host
//! playback engine refers to sounds by asset path (`ns:sounds/path.ogg`);
//! [`StreamKey::from_engine_path`] maps that form back onto the key a
//! producer registered under.

/// Namespace used when an identifier carries none
pub const DEFAULT_NAMESPACE: &str = "relay";

/// Asset directory prefix the host engine prepends to sound paths
const ENGINE_PATH_PREFIX: &str = "sounds/";

/// File extension the host engine appends to sound paths
const ENGINE_PATH_SUFFIX: &str = ".ogg";

/// Unique identifier for a stream (namespace + path)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StreamKey {
    /// Namespace (e.g., "relay")
    pub namespace: String,
    /// Path within the namespace (e.g., "jukebox/3f2a")
    pub path: String,
}

impl StreamKey {
    /// Create a new stream key
    pub fn new(namespace: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            path: path.into(),
        }
    }

    /// Parse `namespace:path`, falling back to [`DEFAULT_NAMESPACE`]
    pub fn parse(id: &str) -> Self {
        match id.split_once(':') {
            Some((namespace, path)) if !namespace.is_empty() => Self::new(namespace, path),
            Some((_, path)) => Self::new(DEFAULT_NAMESPACE, path),
            None => Self::new(DEFAULT_NAMESPACE, id),
        }
    }

    /// Normalize an engine asset path into a stream key
    ///
    /// Strips the `sounds/` directory prefix and the `.ogg` extension, so
    /// `relay:sounds/jukebox/3f2a.ogg` and `relay:jukebox/3f2a` resolve to the
    /// same key.
    pub fn from_engine_path(path: &str) -> Self {
        let key = Self::parse(path.trim());
        let stripped = key
            .path
            .strip_prefix(ENGINE_PATH_PREFIX)
            .unwrap_or(key.path.as_str());
        let stripped = stripped.strip_suffix(ENGINE_PATH_SUFFIX).unwrap_or(stripped);

        Self::new(key.namespace.clone(), stripped)
    }
}

impl std::fmt::Display for StreamKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

impl From<&str> for StreamKey {
    fn from(id: &str) -> Self {
        Self::parse(id)
    }
}
