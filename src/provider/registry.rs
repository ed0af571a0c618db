//! Provider registry: explicit lifecycle for a set of content providers.
//!
//! Embedding applications construct providers, register them here, and hand
//! the registry to the UI layer. There is no process-wide state; dropping
//! the registry (and the `Arc`s it holds) tears everything down.

use dashmap::DashMap;
use std::sync::Arc;

use crate::provider::ContentReader;

/// A concurrent map of provider id to reader.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: DashMap<String, Arc<dyn ContentReader>>,
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.provider_ids())
            .finish()
    }
}

impl ProviderRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under its own id, replacing any previous entry.
    pub fn register(&self, provider: Arc<dyn ContentReader>) {
        self.providers
            .insert(provider.provider_id().to_string(), provider);
    }

    /// Look up a provider by id.
    #[must_use]
    pub fn get(&self, provider_id: &str) -> Option<Arc<dyn ContentReader>> {
        self.providers.get(provider_id).map(|entry| Arc::clone(&entry))
    }

    /// Remove a provider, returning it when present.
    pub fn remove(&self, provider_id: &str) -> Option<Arc<dyn ContentReader>> {
        self.providers.remove(provider_id).map(|(_, provider)| provider)
    }

    /// Ids of all registered providers.
    #[must_use]
    pub fn provider_ids(&self) -> Vec<String> {
        self.providers.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Number of registered providers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
