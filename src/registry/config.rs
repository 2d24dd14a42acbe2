//! Registry configuration

/// Stream registry configuration
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Replace (and close) an existing stream on duplicate registration.
    /// When false, duplicate registration fails with `AlreadyRegistered`.
    pub replace_existing: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            replace_existing: true,
        }
    }
}

impl RegistryConfig {
    /// Set the duplicate registration policy
    pub fn replace_existing(mut self, replace: bool) -> Self {
        self.replace_existing = replace;
        self
    }
}
