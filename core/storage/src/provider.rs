//! Content store trait definition.

use async_trait::async_trait;

use chainvault_common::{ContentAddress, Result};

/// Client for a content-addressed blob store.
///
/// Implementations treat the payload as opaque bytes. The store may be slow
/// or unavailable; implementations must report that as a transient error
/// (`Network` or `Io`) and keep refusals (`Rejected`) and missing objects
/// (`NotFound`) distinct from it.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Get the store name (e.g., "pinata", "local", "memory").
    fn name(&self) -> &str;

    /// Upload bytes and return their content address.
    ///
    /// # Postconditions
    /// - Uploading identical bytes twice yields the same address
    ///
    /// # Errors
    /// - `Rejected` when the payload is too large or the quota is exhausted
    /// - `Network`/`Io` on transport failures
    async fn put(&self, data: Vec<u8>) -> Result<ContentAddress>;

    /// Fetch the bytes stored under an address.
    ///
    /// # Errors
    /// - `NotFound` when the store no longer holds the object
    /// - `Network`/`Io` on transport failures
    async fn get(&self, address: &ContentAddress) -> Result<Vec<u8>>;
}
