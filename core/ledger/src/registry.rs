//! Ledger registry for resolving a ledger client from configuration.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::ledger::ReferenceLedger;
use chainvault_common::{Error, Identity, Result};

/// Factory function type for creating ledgers.
///
/// The second argument is the identity the connection acts for, if any.
pub type LedgerFactory =
    Box<dyn Fn(Value, Option<Identity>) -> Result<Arc<dyn ReferenceLedger>> + Send + Sync>;

/// Registry for ledger factories.
pub struct LedgerRegistry {
    factories: HashMap<String, LedgerFactory>,
}

impl LedgerRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a ledger factory.
    ///
    /// # Errors
    /// - Returns error if name is already registered
    pub fn register(&mut self, name: impl Into<String>, factory: LedgerFactory) -> Result<()> {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(Error::InvalidInput(format!(
                "Ledger '{}' is already registered",
                name
            )));
        }
        self.factories.insert(name, factory);
        Ok(())
    }

    /// Resolve a ledger by name and configuration, optionally bound to `sender`.
    ///
    /// # Errors
    /// - Ledger not registered
    /// - Configuration invalid
    pub fn resolve(
        &self,
        name: &str,
        config: Value,
        sender: Option<Identity>,
    ) -> Result<Arc<dyn ReferenceLedger>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| Error::NotFound(format!("Ledger '{}' is not registered", name)))?;
        factory(config, sender)
    }

    /// Get list of registered ledger names.
    pub fn ledgers(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    /// Check if a ledger is registered.
    pub fn has_ledger(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}

impl Default for LedgerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a registry with the built-in ledgers.
pub fn create_default_registry() -> LedgerRegistry {
    let mut registry = LedgerRegistry::new();

    registry
        .register(
            "memory",
            Box::new(|_, sender| {
                let ledger = crate::memory::MemoryLedger::new();
                Ok(match sender {
                    Some(sender) => Arc::new(ledger.with_sender(sender)),
                    None => Arc::new(ledger),
                })
            }),
        )
        .expect("Failed to register memory ledger");

    registry
        .register(
            "local",
            Box::new(|config, sender| {
                let path = config.get("path").and_then(|v| v.as_str()).ok_or_else(|| {
                    Error::InvalidInput("Local ledger requires 'path'".to_string())
                })?;
                let ledger = crate::local::LocalLedger::open(path)?;
                Ok(match sender {
                    Some(sender) => Arc::new(ledger.with_sender(sender)),
                    None => Arc::new(ledger),
                })
            }),
        )
        .expect("Failed to register local ledger");

    registry
}
