//! Vault service for ChainVault.
//!
//! This module provides:
//! - The secret payloads (credentials and documents) and their encoding
//! - The store / retrieve / delete flows over a content store and a ledger
//! - Filtering of retrieved listings
//! - Wallet login challenges through the [`Signer`] seam
//! - Configuration loading and provider resolution
//!
//! # Architecture
//! The service sits between a front end and the two external collaborators,
//! encrypting on the way out and verifying on the way in. Keys are derived
//! per call from the identity and never stored.

pub mod codec;
pub mod config;
pub mod filter;
pub mod service;
pub mod signer;

pub use codec::{decode, encode, CredentialSecret, DocumentSecret, Secret};
pub use config::{ConfigVersion, KeyMode, ProviderConfig, VaultConfig};
pub use filter::{KindFilter, RecordQuery};
pub use service::{KeySource, Listing, RetrievedItem, StoreReceipt, VaultService};
pub use signer::{LoginProof, Signature, Signer};
