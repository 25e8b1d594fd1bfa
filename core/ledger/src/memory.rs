//! In-memory ledger for testing.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::ledger::ReferenceLedger;
use crate::record::{LedgerRecord, NewRecord};
use crate::state::{authorize, LedgerState};
use chainvault_common::{Identity, Result};

/// In-memory ledger.
///
/// Clones share the same state, so several connections (for example one
/// per simulated session) can observe each other's writes.
#[derive(Clone, Default)]
pub struct MemoryLedger {
    state: Arc<RwLock<LedgerState>>,
    sender: Option<Identity>,
}

impl MemoryLedger {
    /// Create a new empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// A connection to the same ledger that may only act for `sender`.
    pub fn with_sender(&self, sender: Identity) -> Self {
        Self {
            state: self.state.clone(),
            sender: Some(sender),
        }
    }
}

#[async_trait]
impl ReferenceLedger for MemoryLedger {
    fn name(&self) -> &str {
        "memory"
    }

    async fn append(&self, identity: &Identity, record: NewRecord) -> Result<u64> {
        authorize(self.sender.as_ref(), identity)?;
        let index = self
            .state
            .write()
            .await
            .append(identity, record, Utc::now().timestamp());
        debug!(identity = %identity, index, "Record appended");
        Ok(index)
    }

    async fn list(&self, identity: &Identity) -> Result<Vec<LedgerRecord>> {
        authorize(self.sender.as_ref(), identity)?;
        Ok(self.state.read().await.list(identity))
    }

    async fn remove(&self, identity: &Identity, index: u64) -> Result<Vec<LedgerRecord>> {
        authorize(self.sender.as_ref(), identity)?;
        let remaining = self.state.write().await.remove(identity, index)?;
        debug!(identity = %identity, index, remaining = remaining.len(), "Record removed");
        Ok(remaining)
    }

    async fn get_nonce(&self, identity: &Identity) -> Result<u64> {
        authorize(self.sender.as_ref(), identity)?;
        Ok(self.state.read().await.nonce(identity))
    }

    async fn generate_nonce(&self, identity: &Identity) -> Result<u64> {
        authorize(self.sender.as_ref(), identity)?;
        Ok(self.state.write().await.next_nonce(identity))
    }
}
