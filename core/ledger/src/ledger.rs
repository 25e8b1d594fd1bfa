//! Reference ledger trait definition.

use async_trait::async_trait;

use crate::record::{LedgerRecord, NewRecord};
use chainvault_common::{Identity, Result};

/// Client for an owner-scoped, append-ordered record ledger.
///
/// Every call is one ledger transaction. State-changing calls return only
/// once the change is durable (final), so callers may treat a successful
/// `append` or `remove` as committed.
#[async_trait]
pub trait ReferenceLedger: Send + Sync {
    /// Get the ledger name (e.g., "local", "memory").
    fn name(&self) -> &str;

    /// Append a record for an identity.
    ///
    /// # Postconditions
    /// - The record is stamped with the current time
    /// - Returns the index of the new record in the identity's list
    ///
    /// # Errors
    /// - `NotAuthorized` if the connection may not act for `identity`
    async fn append(&self, identity: &Identity, record: NewRecord) -> Result<u64>;

    /// List an identity's records in insertion order.
    ///
    /// # Errors
    /// - `NotAuthorized` if the connection may not act for `identity`
    async fn list(&self, identity: &Identity) -> Result<Vec<LedgerRecord>>;

    /// Remove the record at `index` and return the remaining records.
    ///
    /// # Postconditions
    /// - Records after `index` shift down by one, keeping their order
    ///
    /// # Errors
    /// - `OutOfRange` if the identity has no record at `index`
    /// - `NotAuthorized` if the connection may not act for `identity`
    async fn remove(&self, identity: &Identity, index: u64) -> Result<Vec<LedgerRecord>>;

    /// Read the current login nonce (0 for unknown identities).
    async fn get_nonce(&self, identity: &Identity) -> Result<u64>;

    /// Advance the login nonce and return the new value.
    ///
    /// Must be called at most once per login attempt: a second call
    /// invalidates any challenge built from the previous value.
    async fn generate_nonce(&self, identity: &Identity) -> Result<u64>;
}
