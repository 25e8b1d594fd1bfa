//! Store registry for resolving a content store from configuration.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::provider::ContentStore;
use chainvault_common::{Error, Result};

/// Factory function type for creating stores.
pub type StoreFactory = Box<dyn Fn(Value) -> Result<Arc<dyn ContentStore>> + Send + Sync>;

/// Registry for content store factories.
///
/// Allows dynamic registration and resolution of stores by name and
/// configuration.
pub struct StoreRegistry {
    factories: HashMap<String, StoreFactory>,
}

impl StoreRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a store factory.
    ///
    /// # Errors
    /// - Returns error if name is already registered
    pub fn register(&mut self, name: impl Into<String>, factory: StoreFactory) -> Result<()> {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(Error::InvalidInput(format!(
                "Store '{}' is already registered",
                name
            )));
        }
        self.factories.insert(name, factory);
        Ok(())
    }

    /// Resolve a store by name and configuration.
    ///
    /// # Errors
    /// - Store not registered
    /// - Configuration invalid
    pub fn resolve(&self, name: &str, config: Value) -> Result<Arc<dyn ContentStore>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| Error::NotFound(format!("Store '{}' is not registered", name)))?;
        factory(config)
    }

    /// Get list of registered store names.
    pub fn stores(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    /// Check if a store is registered.
    pub fn has_store(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}

impl Default for StoreRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn max_object_size(config: &Value) -> Option<usize> {
    config
        .get("max_object_size")
        .and_then(|v| v.as_u64())
        .map(|v| v as usize)
}

/// Create a registry with the built-in stores.
pub fn create_default_registry() -> StoreRegistry {
    let mut registry = StoreRegistry::new();

    registry
        .register(
            "memory",
            Box::new(|config| {
                let mut store = crate::memory::MemoryContentStore::new();
                if let Some(limit) = max_object_size(&config) {
                    store = store.with_max_object_size(limit);
                }
                Ok(Arc::new(store))
            }),
        )
        .expect("Failed to register memory store");

    registry
        .register(
            "local",
            Box::new(|config| {
                let root = config.get("root").and_then(|v| v.as_str()).ok_or_else(|| {
                    Error::InvalidInput("Local store requires 'root' path".to_string())
                })?;
                let mut store = crate::local::LocalContentStore::new(root)?;
                if let Some(limit) = max_object_size(&config) {
                    store = store.with_max_object_size(limit);
                }
                Ok(Arc::new(store))
            }),
        )
        .expect("Failed to register local store");

    registry
        .register(
            "pinata",
            Box::new(|config| {
                let config: crate::pinata::PinataConfig = serde_json::from_value(config)
                    .map_err(|e| Error::InvalidInput(format!("Invalid pinata config: {}", e)))?;
                Ok(Arc::new(crate::pinata::PinataGateway::new(config)?))
            }),
        )
        .expect("Failed to register pinata store");

    registry
}
