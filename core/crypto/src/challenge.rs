//! Login challenge rendered for the external signer.
//!
//! The signature over the message is never verified here; the ledger or a
//! server holding the nonce does that.

use chainvault_common::Identity;

/// Prefix of every login message.
pub const CHALLENGE_PREFIX: &str = "Sign this message to log in. Nonce: ";

/// A message to be signed, bound to a ledger-issued nonce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginChallenge {
    /// Identity the challenge was issued for.
    pub identity: Identity,
    /// Nonce read from the ledger.
    pub nonce: u64,
    /// Human-readable message handed to the signer.
    pub message: String,
}

/// Render the login challenge for an identity and nonce.
pub fn build_challenge(identity: &Identity, nonce: u64) -> LoginChallenge {
    LoginChallenge {
        identity: identity.clone(),
        nonce,
        message: format!("{}{}", CHALLENGE_PREFIX, nonce),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_format() {
        let identity = Identity::new("0xAA").unwrap();
        let challenge = build_challenge(&identity, 7);

        assert_eq!(challenge.message, "Sign this message to log in. Nonce: 7");
        assert_eq!(challenge.nonce, 7);
        assert_eq!(challenge.identity, identity);
    }

    #[test]
    fn test_nonce_changes_message() {
        let identity = Identity::new("0xAA").unwrap();
        assert_ne!(
            build_challenge(&identity, 1).message,
            build_challenge(&identity, 2).message
        );
    }
}
