//! In-memory content store for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::address::content_address_for;
use crate::provider::ContentStore;
use chainvault_common::{ContentAddress, Error, Result};

/// In-memory content store.
///
/// Useful for testing and development. Clones share the same objects;
/// everything is lost when the last clone is dropped.
#[derive(Clone, Default)]
pub struct MemoryContentStore {
    objects: Arc<RwLock<HashMap<ContentAddress, Vec<u8>>>>,
    max_object_size: Option<usize>,
}

impl MemoryContentStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject uploads larger than `limit` bytes.
    pub fn with_max_object_size(mut self, limit: usize) -> Self {
        self.max_object_size = Some(limit);
        self
    }

    /// Drop an object, as an unpinning gateway eventually would.
    pub async fn evict(&self, address: &ContentAddress) -> bool {
        self.objects.write().await.remove(address).is_some()
    }

    /// Replace the bytes held under an address, bypassing addressing.
    ///
    /// Simulates a faulty gateway serving the wrong object.
    pub async fn corrupt(&self, address: &ContentAddress, data: Vec<u8>) {
        self.objects.write().await.insert(address.clone(), data);
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Check if empty.
    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn put(&self, data: Vec<u8>) -> Result<ContentAddress> {
        if let Some(limit) = self.max_object_size {
            if data.len() > limit {
                return Err(Error::Rejected(format!(
                    "Object of {} bytes exceeds limit of {} bytes",
                    data.len(),
                    limit
                )));
            }
        }

        let address = content_address_for(&data)?;
        debug!(address = %address, size = data.len(), "Storing object in memory");
        self.objects.write().await.insert(address.clone(), data);
        Ok(address)
    }

    async fn get(&self, address: &ContentAddress) -> Result<Vec<u8>> {
        self.objects
            .read()
            .await
            .get(address)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Object not found: {}", address)))
    }
}
