//! Passphrase mixing using Argon2id.
//!
//! A wallet address is public, so a key derived from it alone protects
//! nothing against someone who knows the address. Users may add a
//! passphrase; it is stretched with Argon2id using a salt bound to the
//! identity, so the same passphrase yields different keys per identity.

use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};

use crate::keys::{digest, KeyMaterial, KEY_LENGTH};
use chainvault_common::{Error, Identity, Result};

/// Domain label for the identity-bound Argon2 salt.
const PASSPHRASE_SALT_CONTEXT: &[u8] = b"chainvault/passphrase-salt/v1";

/// Parameters for Argon2id key derivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// Memory cost in KiB (e.g., 65536 = 64 MiB).
    pub memory_cost: u32,
    /// Number of iterations.
    pub time_cost: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl KdfParams {
    /// Create parameters suitable for interactive use.
    pub fn interactive() -> Self {
        Self {
            memory_cost: 65536, // 64 MiB
            time_cost: 3,
            parallelism: 4,
        }
    }

    /// Create parameters suitable for sensitive data.
    pub fn sensitive() -> Self {
        Self {
            memory_cost: 262144, // 256 MiB
            time_cost: 4,
            parallelism: 4,
        }
    }

    /// Create moderate parameters for constrained devices.
    pub fn moderate() -> Self {
        Self {
            memory_cost: 32768, // 32 MiB
            time_cost: 3,
            parallelism: 2,
        }
    }

    /// Parse a preset name.
    pub fn from_preset(name: &str) -> Result<Self> {
        match name {
            "interactive" => Ok(Self::interactive()),
            "moderate" => Ok(Self::moderate()),
            "sensitive" => Ok(Self::sensitive()),
            other => Err(Error::InvalidInput(format!(
                "Unknown KDF preset '{}': use interactive, moderate, or sensitive",
                other
            ))),
        }
    }
}

impl Default for KdfParams {
    fn default() -> Self {
        Self::interactive()
    }
}

/// Derive key material from an identity and a user passphrase.
///
/// # Preconditions
/// - `passphrase` must not be empty
///
/// # Postconditions
/// - Deterministic for fixed identity, passphrase and params
///
/// # Errors
/// - Returns error if passphrase is empty
/// - Returns error if Argon2id parameters are invalid
pub fn derive_with_passphrase(
    identity: &Identity,
    passphrase: &[u8],
    params: &KdfParams,
) -> Result<KeyMaterial> {
    if passphrase.is_empty() {
        return Err(Error::InvalidInput("Passphrase cannot be empty".to_string()));
    }

    let argon2_params = Params::new(
        params.memory_cost,
        params.time_cost,
        params.parallelism,
        Some(KEY_LENGTH),
    )
    .map_err(|e| Error::Crypto(format!("Invalid KDF parameters: {}", e)))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);
    let salt = digest(PASSPHRASE_SALT_CONTEXT, identity.as_bytes());

    let mut key_bytes = [0u8; KEY_LENGTH];
    argon2
        .hash_password_into(passphrase, &salt, &mut key_bytes)
        .map_err(|e| Error::Crypto(format!("Key derivation failed: {}", e)))?;

    Ok(KeyMaterial::from_bytes(key_bytes))
}
