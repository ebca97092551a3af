use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

use super::mccord::McCordMuseum;
use super::thingiverse::Thingiverse;
use super::traits::Provider;
use crate::config::Config;
use crate::fetch::{Requester, RetryPolicy};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("provider not found: {0}")]
    NotFound(String),
}

/// Registry mapping provider names to provider instances
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: BTreeMap<String, Arc<dyn Provider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register under the provider's own name, replacing any previous entry
    pub fn register(&mut self, provider: Arc<dyn Provider>) {
        self.providers.insert(provider.name().to_string(), provider);
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Provider>, RegistryError> {
        self.providers
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.providers.keys().map(String::as_str).collect()
    }

    /// Built-in providers sharing one requester
    pub fn with_defaults(config: &Config, requester: Arc<dyn Requester>) -> Self {
        let retry = RetryPolicy::from(&config.http);
        let mut registry = Self::new();

        registry.register(Arc::new(Thingiverse::new(
            requester.clone(),
            config.thingiverse.clone(),
            retry,
        )));
        registry.register(Arc::new(McCordMuseum::new(
            requester,
            config.mccord.clone(),
            retry,
        )));

        registry
    }
}
