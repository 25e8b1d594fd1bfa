//! Local filesystem content store.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::address::content_address_for;
use crate::provider::ContentStore;
use chainvault_common::{ContentAddress, Error, Result};

/// Local filesystem content store.
///
/// Stores one file per object, named by its content address, directly
/// under the root directory.
pub struct LocalContentStore {
    root: PathBuf,
    max_object_size: Option<usize>,
}

impl LocalContentStore {
    /// Create a new local store with the given root directory.
    ///
    /// # Postconditions
    /// - Root directory is created if it doesn't exist
    ///
    /// # Errors
    /// - Invalid path
    /// - Permission denied
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        // Sync for constructor
        if !root.exists() {
            std::fs::create_dir_all(&root)?;
        }

        Ok(Self {
            root,
            max_object_size: None,
        })
    }

    /// Reject uploads larger than `limit` bytes.
    pub fn with_max_object_size(mut self, limit: usize) -> Self {
        self.max_object_size = Some(limit);
        self
    }

    /// Get the root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, address: &ContentAddress) -> PathBuf {
        self.root.join(address.as_str())
    }
}

#[async_trait]
impl ContentStore for LocalContentStore {
    fn name(&self) -> &str {
        "local"
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
        let path = self.object_path(&address);

        if fs::try_exists(&path).await? {
            debug!(address = %address, "Object already present");
            return Ok(address);
        }

        // Write-then-rename so readers never observe a partial object.
        let tmp = self.root.join(format!(".{}.tmp", address));
        fs::write(&tmp, &data).await?;
        fs::rename(&tmp, &path).await?;

        debug!(address = %address, size = data.len(), "Object written");
        Ok(address)
    }

    async fn get(&self, address: &ContentAddress) -> Result<Vec<u8>> {
        match fs::read(self.object_path(address)).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::NotFound(format!("Object not found: {}", address)))
            }
            Err(e) => Err(e.into()),
        }
    }
}
