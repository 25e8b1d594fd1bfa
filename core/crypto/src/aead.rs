//! Authenticated encryption using XChaCha20-Poly1305.
//!
//! XChaCha20-Poly1305 provides both confidentiality and authenticity,
//! with a 24-byte nonce that is safe for random generation. A wrong key
//! or a modified blob fails tag verification instead of decrypting to
//! garbage, which also makes decryption the integrity check for bytes
//! returned by an untrusted gateway.

use chacha20poly1305::{
    aead::{generic_array::GenericArray, Aead, AeadCore, KeyInit, OsRng},
    XChaCha20Poly1305,
};

use crate::keys::KeyMaterial;
use chainvault_common::{Error, Result};

/// Blob format version written as the first byte.
pub const BLOB_VERSION: u8 = 1;

/// Nonce size for XChaCha20-Poly1305 (24 bytes).
pub const NONCE_SIZE: usize = 24;

/// Authentication tag size (16 bytes).
pub const TAG_SIZE: usize = 16;

/// Fixed per-blob overhead: version byte, nonce and tag.
pub const BLOB_OVERHEAD: usize = 1 + NONCE_SIZE + TAG_SIZE;

/// Ciphertext as it travels to and from the content store.
///
/// Layout: `version || nonce || ciphertext || tag`.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptedBlob(Vec<u8>);

impl EncryptedBlob {
    /// Wrap bytes fetched from a content store.
    ///
    /// No validation happens here; malformed blobs are rejected by [`decrypt`].
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Get the serialized blob.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume into the serialized blob.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Get the total length.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for EncryptedBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EncryptedBlob({} bytes)", self.0.len())
    }
}

/// Encrypt plaintext using XChaCha20-Poly1305.
///
/// # Postconditions
/// - Returns `version || nonce || ciphertext || tag`
/// - The nonce is randomly generated, so equal plaintexts encrypt differently
/// - The blob length is plaintext length + BLOB_OVERHEAD
///
/// # Errors
/// - Returns error if encryption fails
pub fn encrypt(key: &KeyMaterial, plaintext: &[u8]) -> Result<EncryptedBlob> {
    let cipher = XChaCha20Poly1305::new(GenericArray::from_slice(key.as_bytes()));
    let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| Error::Crypto(format!("Encryption failed: {}", e)))?;

    let mut blob = Vec::with_capacity(1 + NONCE_SIZE + ciphertext.len());
    blob.push(BLOB_VERSION);
    blob.extend_from_slice(&nonce);
    blob.extend_from_slice(&ciphertext);

    Ok(EncryptedBlob(blob))
}

/// Decrypt a blob using XChaCha20-Poly1305.
///
/// # Postconditions
/// - Returns the original plaintext
/// - Verifies the authentication tag before returning
///
/// # Errors
/// - Returns error if the version byte is unknown
/// - Returns error if the blob is too short
/// - Returns error if authentication fails (wrong key or tampered data)
pub fn decrypt(key: &KeyMaterial, blob: &EncryptedBlob) -> Result<Vec<u8>> {
    let bytes = blob.as_bytes();

    if bytes.len() < BLOB_OVERHEAD {
        return Err(Error::Crypto("Ciphertext too short".to_string()));
    }

    let (version, rest) = bytes.split_at(1);
    if version[0] != BLOB_VERSION {
        return Err(Error::Crypto(format!(
            "Unsupported blob version: {}",
            version[0]
        )));
    }

    let (nonce_bytes, encrypted) = rest.split_at(NONCE_SIZE);
    let nonce = GenericArray::from_slice(nonce_bytes);

    let cipher = XChaCha20Poly1305::new(GenericArray::from_slice(key.as_bytes()));

    cipher
        .decrypt(nonce, encrypted)
        .map_err(|_| Error::Crypto("Decryption failed: wrong key or corrupted data".to_string()))
}
