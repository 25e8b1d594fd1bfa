//! Common error types for ChainVault.

use thiserror::Error;

use crate::types::ContentAddress;

/// Top-level error type for ChainVault operations.
///
/// Every variant maps onto one outcome class callers need to tell apart:
/// bad input, corrupt payloads, wrong keys, retryable I/O, and the terminal
/// answers given by the content store and the ledger.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid input provided. Raised before any I/O takes place.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Payload bytes are not a valid secret encoding.
    #[error("Codec error: {0}")]
    Codec(String),

    /// Wrong key, or ciphertext that is corrupted, truncated or foreign.
    #[error("Cryptographic error: {0}")]
    Crypto(String),

    /// Network or remote service failure. Retryable.
    #[error("Network error: {0}")]
    Network(String),

    /// I/O operation failed. Retryable.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The collaborator refused the request (payload too large, quota
    /// exceeded, credentials refused).
    #[error("Rejected: {0}")]
    Rejected(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Ledger index does not exist (or no longer exists) for the identity.
    #[error("Index {index} out of range ({len} records)")]
    OutOfRange {
        /// Requested index.
        index: u64,
        /// Number of records the identity currently owns.
        len: u64,
    },

    /// The caller does not own the records it tried to access.
    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    /// Serialization or deserialization of configuration or ledger state failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The blob reached the content store but no ledger record references it.
    #[error("Stored at {address} but not referenced on the ledger: {source}")]
    Orphaned {
        /// Address of the unreferenced blob.
        address: ContentAddress,
        /// Why the ledger append failed.
        #[source]
        source: Box<Error>,
    },

    /// A newer request of the same kind started before this one completed.
    #[error("Superseded by a newer request")]
    Superseded,
}

impl Error {
    /// Whether the failed call may be repeated with a chance of success.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Network(_) | Error::Io(_))
    }

    /// Whether the operation partially happened before failing.
    pub fn is_partial(&self) -> bool {
        matches!(self, Error::Orphaned { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(Error::Network("reset".to_string()).is_transient());
        assert!(Error::Io(std::io::Error::other("disk")).is_transient());
        assert!(!Error::Rejected("too large".to_string()).is_transient());
        assert!(!Error::NotFound("gone".to_string()).is_transient());
        assert!(!Error::OutOfRange { index: 3, len: 1 }.is_transient());
    }

    #[test]
    fn test_orphaned_is_partial() {
        let err = Error::Orphaned {
            address: ContentAddress::new("b2-abc").unwrap(),
            source: Box::new(Error::Network("ledger down".to_string())),
        };
        assert!(err.is_partial());
        assert!(!err.is_transient());
        assert!(err.to_string().contains("b2-abc"));
        assert!(!Error::Crypto("bad tag".to_string()).is_partial());
    }
}
