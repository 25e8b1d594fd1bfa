//! Secret payloads and their canonical byte encoding.
//!
//! A secret is encoded as a JSON object tagged by `kind`, with document
//! bytes carried as standard padded base64. The encoding is the plaintext
//! handed to the cipher, so it never leaves the process unencrypted.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use chainvault_common::{Error, Result};
use chainvault_ledger::RecordKind;

/// A stored login.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct CredentialSecret {
    /// Service the login belongs to (e.g. "email", "bank").
    pub account_type: String,
    /// Login name.
    pub username: String,
    /// Login password.
    pub password: String,
}

impl fmt::Debug for CredentialSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSecret")
            .field("account_type", &self.account_type)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// A stored file.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct DocumentSecret {
    /// Original file name.
    pub file_name: String,
    /// MIME type; may be empty when unknown.
    pub mime_type: String,
    /// File contents; may be empty.
    pub bytes: Vec<u8>,
}

impl fmt::Debug for DocumentSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentSecret")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("bytes", &format_args!("[{} bytes]", self.bytes.len()))
            .finish()
    }
}

/// A secret the vault can store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Secret {
    Credential(CredentialSecret),
    Document(DocumentSecret),
}

impl Secret {
    /// Build a credential secret.
    pub fn credential(
        account_type: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Secret::Credential(CredentialSecret {
            account_type: account_type.into(),
            username: username.into(),
            password: password.into(),
        })
    }

    /// Build a document secret.
    pub fn document(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Secret::Document(DocumentSecret {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        })
    }

    /// Short name of the kind ("credential" or "document").
    pub fn label(&self) -> &'static str {
        match self {
            Secret::Credential(_) => "credential",
            Secret::Document(_) => "document",
        }
    }

    /// Ledger metadata describing this secret.
    pub fn record_kind(&self) -> RecordKind {
        match self {
            Secret::Credential(_) => RecordKind::credential(),
            Secret::Document(doc) => RecordKind::document(&doc.file_name, &doc.mime_type),
        }
    }

    /// Check that every required field is present.
    ///
    /// # Errors
    /// - `InvalidInput` naming the first missing field
    pub fn validate(&self) -> Result<()> {
        let missing = match self {
            Secret::Credential(cred) => [
                ("account_type", cred.account_type.is_empty()),
                ("username", cred.username.is_empty()),
                ("password", cred.password.is_empty()),
            ]
            .into_iter()
            .find(|(_, empty)| *empty)
            .map(|(field, _)| field),
            Secret::Document(doc) => doc.file_name.is_empty().then_some("file_name"),
        };

        match missing {
            Some(field) => Err(Error::InvalidInput(format!(
                "{} secret requires a non-empty {}",
                self.label(),
                field
            ))),
            None => Ok(()),
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum WireRef<'a> {
    Credential {
        account_type: &'a str,
        username: &'a str,
        password: &'a str,
    },
    Document {
        file_name: &'a str,
        mime_type: &'a str,
        content: String,
    },
}

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum WireOwned {
    Credential {
        account_type: String,
        username: String,
        password: String,
    },
    Document {
        file_name: String,
        mime_type: String,
        content: String,
    },
}

/// Encode a secret into its canonical plaintext bytes.
///
/// # Preconditions
/// - All required fields are non-empty (see [`Secret::validate`])
///
/// # Postconditions
/// - `decode(&encode(s)?)? == s`
///
/// # Errors
/// - `InvalidInput` if a required field is missing
pub fn encode(secret: &Secret) -> Result<Vec<u8>> {
    secret.validate()?;

    let wire = match secret {
        Secret::Credential(cred) => WireRef::Credential {
            account_type: &cred.account_type,
            username: &cred.username,
            password: &cred.password,
        },
        Secret::Document(doc) => WireRef::Document {
            file_name: &doc.file_name,
            mime_type: &doc.mime_type,
            content: STANDARD.encode(&doc.bytes),
        },
    };

    let encoded = serde_json::to_vec(&wire).map_err(|e| Error::Codec(e.to_string()));
    if let WireRef::Document { mut content, .. } = wire {
        content.zeroize();
    }
    encoded
}

/// Decode plaintext bytes back into a secret.
///
/// # Errors
/// - `Codec` if the bytes are not a well-formed secret encoding
pub fn decode(bytes: &[u8]) -> Result<Secret> {
    let wire: WireOwned = serde_json::from_slice(bytes)
        .map_err(|e| Error::Codec(format!("Malformed secret: {}", e)))?;

    Ok(match wire {
        WireOwned::Credential {
            account_type,
            username,
            password,
        } => Secret::Credential(CredentialSecret {
            account_type,
            username,
            password,
        }),
        WireOwned::Document {
            file_name,
            mime_type,
            mut content,
        } => {
            let decoded = STANDARD.decode(content.as_bytes());
            content.zeroize();
            let bytes =
                decoded.map_err(|e| Error::Codec(format!("Invalid document content: {}", e)))?;
            Secret::Document(DocumentSecret {
                file_name,
                mime_type,
                bytes,
            })
        }
    })
}
