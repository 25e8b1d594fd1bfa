//! Common types used throughout ChainVault.

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroize;

/// Externally issued address identifying a user.
///
/// The value is opaque to the core: it is never parsed, checksummed or
/// case-normalised, only checked for shape so it can safely key derivation
/// and ledger lookups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity(String);

impl Identity {
    /// Create a new Identity from a string.
    ///
    /// # Preconditions
    /// - `address` must be non-empty
    /// - `address` must not contain whitespace or control characters
    ///
    /// # Errors
    /// - Returns `InvalidInput` if the address is malformed
    pub fn new(address: impl Into<String>) -> crate::Result<Self> {
        let address = address.into();
        if address.is_empty() {
            return Err(crate::Error::InvalidInput(
                "Identity cannot be empty".to_string(),
            ));
        }
        if address
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
        {
            return Err(crate::Error::InvalidInput(
                "Identity cannot contain whitespace or control characters".to_string(),
            ));
        }
        Ok(Self(address))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the raw bytes fed into key derivation.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Locator returned by a content-addressed store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentAddress(String);

impl ContentAddress {
    /// Wrap an address produced by a content store.
    ///
    /// # Errors
    /// - Returns error if the address is empty or contains a path separator
    pub fn new(address: impl Into<String>) -> crate::Result<Self> {
        let address = address.into();
        if address.is_empty() {
            return Err(crate::Error::InvalidInput(
                "Content address cannot be empty".to_string(),
            ));
        }
        if address.contains('/') || address.contains('\\') {
            return Err(crate::Error::InvalidInput(
                "Content address cannot contain separators".to_string(),
            ));
        }
        Ok(Self(address))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sensitive data wrapper that zeroizes on drop.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct SensitiveBytes(Vec<u8>);

impl SensitiveBytes {
    /// Create new sensitive bytes.
    pub fn new(data: Vec<u8>) -> Self {
        Self(data)
    }

    /// Get a reference to the inner bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Get the length.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SensitiveBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SensitiveBytes([REDACTED; {} bytes])", self.0.len())
    }
}
