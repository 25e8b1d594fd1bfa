//! Ledger state shared by the in-process ledgers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::record::{LedgerRecord, NewRecord};
use chainvault_common::{Error, Identity, Result};

/// Records and nonce owned by one identity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Account {
    #[serde(default)]
    records: Vec<LedgerRecord>,
    #[serde(default)]
    nonce: u64,
}

/// Every account, keyed by identity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct LedgerState {
    #[serde(default)]
    accounts: BTreeMap<String, Account>,
}

impl LedgerState {
    pub(crate) fn append(&mut self, identity: &Identity, record: NewRecord, timestamp: i64) -> u64 {
        let account = self.accounts.entry(identity.as_str().to_string()).or_default();
        account.records.push(LedgerRecord {
            content_address: record.content_address,
            kind: record.kind,
            timestamp,
        });
        (account.records.len() - 1) as u64
    }

    pub(crate) fn list(&self, identity: &Identity) -> Vec<LedgerRecord> {
        self.accounts
            .get(identity.as_str())
            .map(|account| account.records.clone())
            .unwrap_or_default()
    }

    pub(crate) fn remove(&mut self, identity: &Identity, index: u64) -> Result<Vec<LedgerRecord>> {
        let account = self.accounts.get_mut(identity.as_str());
        let len = account.as_ref().map_or(0, |a| a.records.len() as u64);

        match account {
            Some(account) if index < len => {
                account.records.remove(index as usize);
                Ok(account.records.clone())
            }
            _ => Err(Error::OutOfRange { index, len }),
        }
    }

    pub(crate) fn nonce(&self, identity: &Identity) -> u64 {
        self.accounts
            .get(identity.as_str())
            .map_or(0, |account| account.nonce)
    }

    pub(crate) fn next_nonce(&mut self, identity: &Identity) -> u64 {
        let account = self.accounts.entry(identity.as_str().to_string()).or_default();
        account.nonce += 1;
        account.nonce
    }
}

/// Enforce that a connection bound to `sender` only acts for itself.
pub(crate) fn authorize(sender: Option<&Identity>, identity: &Identity) -> Result<()> {
    match sender {
        Some(sender) if sender != identity => Err(Error::NotAuthorized(format!(
            "{} may not access records of {}",
            sender, identity
        ))),
        _ => Ok(()),
    }
}
