//! Search and date filtering over a retrieved listing.

use chrono::NaiveDate;

use crate::codec::Secret;
use crate::service::{Listing, RetrievedItem};
use chainvault_common::{Error, Result};
use chainvault_ledger::RecordKind;

/// Which kind of record a query selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindFilter {
    Credential,
    Document,
}

impl std::str::FromStr for KindFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "credential" => Ok(KindFilter::Credential),
            "document" => Ok(KindFilter::Document),
            other => Err(Error::InvalidInput(format!("Unknown record kind: {}", other))),
        }
    }
}

/// A pure projection over a listing.
///
/// All set criteria must match. An empty query matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordQuery {
    /// Case-insensitive substring.
    ///
    /// Credentials match on account type or username, documents on file
    /// name. Items that failed to decrypt match on ledger metadata only.
    pub text: Option<String>,
    /// UTC calendar day the record was appended on.
    pub date: Option<NaiveDate>,
    /// Record kind.
    pub kind: Option<KindFilter>,
}

impl RecordQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Parse a `YYYY-MM-DD` day.
    ///
    /// # Errors
    /// - `InvalidInput` if the date is malformed
    pub fn with_date_str(self, date: &str) -> Result<Self> {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| Error::InvalidInput(format!("Invalid date '{}': {}", date, e)))?;
        Ok(self.with_date(date))
    }

    pub fn with_kind(mut self, kind: KindFilter) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Check a single item against the query.
    pub fn matches(&self, item: &RetrievedItem) -> bool {
        self.matches_kind(&item.record.kind) && self.matches_date(item) && self.matches_text(item)
    }

    /// Items of `listing` matching the query, in listing order.
    pub fn apply<'a>(&self, listing: &'a Listing) -> Vec<&'a RetrievedItem> {
        listing.items.iter().filter(|item| self.matches(item)).collect()
    }

    fn matches_kind(&self, kind: &RecordKind) -> bool {
        match (self.kind, kind) {
            (None, _) => true,
            (Some(KindFilter::Credential), RecordKind::Credential { .. }) => true,
            (Some(KindFilter::Document), RecordKind::Document { .. }) => true,
            _ => false,
        }
    }

    fn matches_date(&self, item: &RetrievedItem) -> bool {
        match self.date {
            None => true,
            Some(date) => item
                .record
                .stored_at()
                .is_some_and(|stored| stored.date_naive() == date),
        }
    }

    fn matches_text(&self, item: &RetrievedItem) -> bool {
        let needle = match self.text.as_deref() {
            None | Some("") => return true,
            Some(text) => text.to_lowercase(),
        };
        let contains = |haystack: &str| haystack.to_lowercase().contains(&needle);

        match &item.result {
            Ok(Secret::Credential(cred)) => contains(&cred.account_type) || contains(&cred.username),
            Ok(Secret::Document(doc)) => contains(&doc.file_name),
            Err(_) => item.record.kind.file_name().is_some_and(contains),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainvault_common::ContentAddress;
    use chainvault_ledger::LedgerRecord;

    // 2024-03-05T12:00:00Z
    const MARCH_5: i64 = 1_709_640_000;

    fn item(index: u64, kind: RecordKind, timestamp: i64, result: Result<Secret>) -> RetrievedItem {
        RetrievedItem {
            index,
            record: LedgerRecord {
                content_address: ContentAddress::new(format!("Qm{}", index)).unwrap(),
                kind,
                timestamp,
            },
            result,
        }
    }

    fn listing() -> Listing {
        Listing {
            identity: chainvault_common::Identity::new("0xAA").unwrap(),
            items: vec![
                item(
                    0,
                    RecordKind::credential(),
                    MARCH_5,
                    Ok(Secret::credential("Email", "alice", "pw")),
                ),
                item(
                    1,
                    RecordKind::document("Report.pdf", "application/pdf"),
                    MARCH_5 + 86_400,
                    Ok(Secret::document("Report.pdf", "application/pdf", vec![1])),
                ),
                item(
                    2,
                    RecordKind::document("taxes.pdf", "application/pdf"),
                    MARCH_5,
                    Err(Error::NotFound("gone".to_string())),
                ),
                item(
                    3,
                    RecordKind::credential(),
                    MARCH_5,
                    Err(Error::Crypto("bad tag".to_string())),
                ),
            ],
        }
    }

    fn indexes(items: Vec<&RetrievedItem>) -> Vec<u64> {
        items.iter().map(|item| item.index).collect()
    }

    #[test]
    fn test_empty_query_matches_all() {
        let listing = listing();
        assert_eq!(indexes(RecordQuery::new().apply(&listing)), vec![0, 1, 2, 3]);
        assert_eq!(
            indexes(RecordQuery::new().with_text("").apply(&listing)),
            vec![0, 1, 2, 3]
        );
    }

    #[test]
    fn test_text_case_insensitive() {
        let listing = listing();
        assert_eq!(indexes(RecordQuery::new().with_text("EMAIL").apply(&listing)), vec![0]);
        assert_eq!(indexes(RecordQuery::new().with_text("ALI").apply(&listing)), vec![0]);
        assert_eq!(indexes(RecordQuery::new().with_text("report").apply(&listing)), vec![1]);
    }

    #[test]
    fn test_text_falls_back_to_metadata() {
        let listing = listing();
        assert_eq!(indexes(RecordQuery::new().with_text("TAXES").apply(&listing)), vec![2]);
        // Nothing searchable survives for an undecryptable credential.
        assert!(RecordQuery::new().with_text("json").apply(&listing).is_empty());
    }

    #[test]
    fn test_date_matches_utc_day() {
        let listing = listing();
        let query = RecordQuery::new().with_date_str("2024-03-06").unwrap();
        assert_eq!(indexes(query.apply(&listing)), vec![1]);

        let query = RecordQuery::new().with_date_str("2024-03-05").unwrap();
        assert_eq!(indexes(query.apply(&listing)), vec![0, 2, 3]);
    }

    #[test]
    fn test_invalid_date() {
        assert!(matches!(
            RecordQuery::new().with_date_str("05/03/2024"),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_combined_criteria() {
        let listing = listing();
        let query = RecordQuery::new()
            .with_kind(KindFilter::Document)
            .with_text("pdf")
            .with_date_str("2024-03-05")
            .unwrap();
        assert_eq!(indexes(query.apply(&listing)), vec![2]);
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("credential".parse::<KindFilter>().unwrap(), KindFilter::Credential);
        assert_eq!("document".parse::<KindFilter>().unwrap(), KindFilter::Document);
        assert!("wallet".parse::<KindFilter>().is_err());
    }
}
