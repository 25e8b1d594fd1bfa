//! Cryptographic primitives for ChainVault.
//!
//! This module provides:
//! - Deterministic key derivation from a wallet identity (BLAKE2b)
//! - Optional passphrase mixing using Argon2id
//! - Authenticated encryption using XChaCha20-Poly1305
//! - The login challenge message handed to the external signer
//!
//! # Security Guarantees
//! - All key material is automatically zeroized on drop
//! - No plaintext or key material is ever logged
//! - Wrong-key and tampered-blob decryption is detected, never returned as plaintext

pub mod aead;
pub mod challenge;
pub mod kdf;
pub mod keys;

pub use aead::{decrypt, encrypt, EncryptedBlob};
pub use challenge::{build_challenge, LoginChallenge};
pub use kdf::{derive_with_passphrase, KdfParams};
pub use keys::{KeyMaterial, KEY_LENGTH};
