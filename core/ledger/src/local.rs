//! File-backed ledger.
//!
//! The JSON document is the only state. Each call opens a sidecar
//! `<document>.lock` file and holds an advisory lock on it for the whole
//! read-modify-write, so separate handles and separate processes over the
//! same document see each other's changes and never lose an update.

use async_trait::async_trait;
use chrono::Utc;
use fd_lock::RwLock;
use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::ledger::ReferenceLedger;
use crate::record::{LedgerRecord, NewRecord};
use crate::state::{authorize, LedgerState};
use chainvault_common::{Error, Identity, Result};

/// Ledger persisted as a single JSON document.
///
/// Mutations run under an exclusive lock: the document is re-read, the
/// change applied, and the result written to a temporary file that is
/// renamed over the document. A mutation that fails leaves the document
/// untouched. Reads take a shared lock.
#[derive(Debug, Clone)]
pub struct LocalLedger {
    path: PathBuf,
    sender: Option<Identity>,
}

impl LocalLedger {
    /// Open the ledger at `path`, creating the parent directory if needed.
    ///
    /// # Errors
    /// - I/O errors reading the document
    /// - Malformed document
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // Reject a malformed document up front.
        {
            let lock = RwLock::new(lock_file(&path)?);
            let _guard = lock.read()?;
            read_state(&path)?;
        }

        info!(path = %path.display(), "Ledger opened");
        Ok(Self { path, sender: None })
    }

    /// A connection to the same ledger that may only act for `sender`.
    pub fn with_sender(&self, sender: Identity) -> Self {
        Self {
            path: self.path.clone(),
            sender: Some(sender),
        }
    }

    /// Get the document path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the current document under a shared lock.
    async fn snapshot(&self) -> Result<LedgerState> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            let lock = RwLock::new(lock_file(&path)?);
            let _guard = lock.read()?;
            read_state(&path)
        })
        .await
        .map_err(|e| Error::Io(io::Error::other(e)))?
    }

    /// Apply `change` to the current document under an exclusive lock and
    /// persist the result. Nothing is written if `change` fails.
    async fn transact<T, F>(&self, change: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut LedgerState) -> Result<T> + Send + 'static,
    {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            let mut lock = RwLock::new(lock_file(&path)?);
            let _guard = lock.write()?;

            let mut state = read_state(&path)?;
            let out = change(&mut state)?;
            write_state(&path, &state)?;
            Ok(out)
        })
        .await
        .map_err(|e| Error::Io(io::Error::other(e)))?
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

fn lock_file(path: &Path) -> Result<File> {
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(sibling(path, ".lock"))?;
    Ok(file)
}

fn read_state(path: &Path) -> Result<LedgerState> {
    match std::fs::read(path) {
        Ok(data) => Ok(serde_json::from_slice(&data)?),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(LedgerState::default()),
        Err(e) => Err(e.into()),
    }
}

fn write_state(path: &Path, state: &LedgerState) -> Result<()> {
    let data = serde_json::to_vec_pretty(state)?;
    let tmp = sibling(path, ".tmp");

    let mut file = File::create(&tmp)?;
    file.write_all(&data)?;
    file.sync_all()?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[async_trait]
impl ReferenceLedger for LocalLedger {
    fn name(&self) -> &str {
        "local"
    }

    async fn append(&self, identity: &Identity, record: NewRecord) -> Result<u64> {
        authorize(self.sender.as_ref(), identity)?;
        let owner = identity.clone();
        let index = self
            .transact(move |state| Ok(state.append(&owner, record, Utc::now().timestamp())))
            .await?;

        debug!(identity = %identity, index, "Record appended");
        Ok(index)
    }

    async fn list(&self, identity: &Identity) -> Result<Vec<LedgerRecord>> {
        authorize(self.sender.as_ref(), identity)?;
        Ok(self.snapshot().await?.list(identity))
    }

    async fn remove(&self, identity: &Identity, index: u64) -> Result<Vec<LedgerRecord>> {
        authorize(self.sender.as_ref(), identity)?;
        let owner = identity.clone();
        let remaining = self
            .transact(move |state| state.remove(&owner, index))
            .await?;

        debug!(identity = %identity, index, remaining = remaining.len(), "Record removed");
        Ok(remaining)
    }

    async fn get_nonce(&self, identity: &Identity) -> Result<u64> {
        authorize(self.sender.as_ref(), identity)?;
        Ok(self.snapshot().await?.nonce(identity))
    }

    async fn generate_nonce(&self, identity: &Identity) -> Result<u64> {
        authorize(self.sender.as_ref(), identity)?;
        let owner = identity.clone();
        self.transact(move |state| Ok(state.next_nonce(&owner)))
            .await
    }
}
