//! Key material with secure memory handling.
//!
//! Keys are never stored or transmitted. They are recomputed from the
//! identity on every operation and zeroize their memory on drop.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use std::fmt;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use chainvault_common::Identity;

/// Length of encryption keys in bytes (256-bit).
pub const KEY_LENGTH: usize = 32;

/// Domain label for identity-only key derivation.
const IDENTITY_KEY_CONTEXT: &[u8] = b"chainvault/identity-key/v1";

/// Symmetric key protecting a user's blobs.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial {
    key: [u8; KEY_LENGTH],
}

impl KeyMaterial {
    /// Derive the key for an identity.
    ///
    /// # Postconditions
    /// - Identical identities always yield identical keys
    /// - No I/O, no randomness, no retained state
    pub fn derive(identity: &Identity) -> Self {
        Self::from_bytes(digest(IDENTITY_KEY_CONTEXT, identity.as_bytes()))
    }

    /// Create key material from raw bytes.
    pub fn from_bytes(key: [u8; KEY_LENGTH]) -> Self {
        Self { key }
    }

    /// Get the key bytes.
    ///
    /// # Security
    /// The returned slice should be used immediately and not stored.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key
    }
}

impl PartialEq for KeyMaterial {
    fn eq(&self, other: &Self) -> bool {
        self.key[..].ct_eq(&other.key[..]).into()
    }
}

impl Eq for KeyMaterial {}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyMaterial([REDACTED])")
    }
}

/// BLAKE2b-256 over a domain label followed by the input.
pub(crate) fn digest(context: &[u8], input: &[u8]) -> [u8; KEY_LENGTH] {
    let mut hasher = Blake2b::<U32>::new();
    hasher.update(context);
    hasher.update(input);

    let result = hasher.finalize();
    let mut out = [0u8; KEY_LENGTH];
    out.copy_from_slice(&result);
    out
}
