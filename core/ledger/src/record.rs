//! Ledger record schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use chainvault_common::ContentAddress;

/// File type recorded for credential entries.
pub const CREDENTIAL_FILE_TYPE: &str = "json";

/// Kind-specific metadata carried by a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordKind {
    /// A stored login credential.
    Credential {
        /// Payload format of the blob.
        file_type: String,
    },
    /// A stored document.
    Document {
        /// Original file name.
        file_name: String,
        /// MIME type of the original file.
        file_type: String,
    },
}

impl RecordKind {
    /// Metadata for a credential entry.
    pub fn credential() -> Self {
        RecordKind::Credential {
            file_type: CREDENTIAL_FILE_TYPE.to_string(),
        }
    }

    /// Metadata for a document entry.
    pub fn document(file_name: impl Into<String>, file_type: impl Into<String>) -> Self {
        RecordKind::Document {
            file_name: file_name.into(),
            file_type: file_type.into(),
        }
    }

    /// Short name of the kind ("credential" or "document").
    pub fn label(&self) -> &'static str {
        match self {
            RecordKind::Credential { .. } => "credential",
            RecordKind::Document { .. } => "document",
        }
    }

    /// The recorded file type.
    pub fn file_type(&self) -> &str {
        match self {
            RecordKind::Credential { file_type } | RecordKind::Document { file_type, .. } => {
                file_type
            }
        }
    }

    /// The recorded file name, for documents.
    pub fn file_name(&self) -> Option<&str> {
        match self {
            RecordKind::Credential { .. } => None,
            RecordKind::Document { file_name, .. } => Some(file_name),
        }
    }
}

/// A record submitted for appending; the ledger assigns the timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    /// Address of the encrypted blob.
    pub content_address: ContentAddress,
    /// Kind-specific metadata.
    pub kind: RecordKind,
}

/// A record as held by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    /// Address of the encrypted blob.
    pub content_address: ContentAddress,
    /// Kind-specific metadata.
    #[serde(flatten)]
    pub kind: RecordKind,
    /// Seconds since the Unix epoch at append time.
    pub timestamp: i64,
}

impl LedgerRecord {
    /// The append time as a UTC datetime.
    pub fn stored_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_schema() {
        let record = LedgerRecord {
            content_address: ContentAddress::new("QmCred").unwrap(),
            kind: RecordKind::credential(),
            timestamp: 1_700_000_000,
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "content_address": "QmCred",
                "kind": "credential",
                "file_type": "json",
                "timestamp": 1_700_000_000
            })
        );
    }

    #[test]
    fn test_document_schema_roundtrip() {
        let record = LedgerRecord {
            content_address: ContentAddress::new("QmDoc").unwrap(),
            kind: RecordKind::document("report.pdf", "application/pdf"),
            timestamp: 1_700_000_000,
        };

        let json = serde_json::to_string(&record).unwrap();
        let back: LedgerRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
        assert_eq!(back.kind.file_name(), Some("report.pdf"));
        assert_eq!(back.kind.file_type(), "application/pdf");
        assert_eq!(back.kind.label(), "document");
    }

    #[test]
    fn test_stored_at() {
        let record = LedgerRecord {
            content_address: ContentAddress::new("QmCred").unwrap(),
            kind: RecordKind::credential(),
            timestamp: 86_400,
        };

        let stored = record.stored_at().unwrap();
        assert_eq!(stored.format("%Y-%m-%d").to_string(), "1970-01-02");
    }
}
