//! Wallet signer seam.

use async_trait::async_trait;
use std::fmt;

use chainvault_common::{Identity, Result};
use chainvault_crypto::LoginChallenge;

/// Opaque signature produced by a wallet.
#[derive(Clone, PartialEq, Eq)]
pub struct Signature(Vec<u8>);

impl Signature {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature([{} bytes])", self.0.len())
    }
}

/// External wallet that owns an identity and can sign messages.
///
/// Signatures are not verified locally; whoever holds the nonce does that.
#[async_trait]
pub trait Signer: Send + Sync {
    /// The identity (address) the wallet controls.
    async fn identity(&self) -> Result<Identity>;

    /// Sign a human-readable message.
    async fn sign(&self, message: &str) -> Result<Signature>;
}

/// A signed login challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginProof {
    pub challenge: LoginChallenge,
    pub signature: Signature,
}
