//! Proof records and their editable fields.

use crate::error::PMError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One editable field of a [`ProofRecord`].
///
/// Declaration order is the canonical order used when a record is serialized for signing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Url,
    Timestamp,
    Status,
    Hash,
}

impl Field {
    /// All fields, in canonical order.
    pub const ALL: [Field; 4] = [Field::Url, Field::Timestamp, Field::Status, Field::Hash];

    pub fn name(&self) -> &'static str {
        match self {
            Field::Url => "url",
            Field::Timestamp => "timestamp",
            Field::Status => "status",
            Field::Hash => "hash",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = PMError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| PMError::UnknownField(s.to_string()))
    }
}

/// A webhook delivery receipt, as displayed and edited by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProofRecord {
    pub url: String,
    /// ISO-8601 timestamp, kept as text.
    pub timestamp: String,
    /// Numeric HTTP status code, kept as text.
    pub status: String,
    pub hash: String,
}

impl ProofRecord {
    pub fn new(
        url: impl Into<String>,
        timestamp: impl Into<String>,
        status: impl Into<String>,
        hash: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            timestamp: timestamp.into(),
            status: status.into(),
            hash: hash.into(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Url => &self.url,
            Field::Timestamp => &self.timestamp,
            Field::Status => &self.status,
            Field::Hash => &self.hash,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::Url => &mut self.url,
            Field::Timestamp => &mut self.timestamp,
            Field::Status => &mut self.status,
            Field::Hash => &mut self.hash,
        };
        *slot = value.into();
    }

    /// Field values in canonical order.
    pub fn values(&self) -> [&str; 4] {
        Field::ALL.map(|field| self.get(field))
    }
}

/// The record as it was at signing time.
///
/// Never mutated after construction; only used as the reset target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginalRecord(ProofRecord);

impl OriginalRecord {
    pub fn new(record: ProofRecord) -> Self {
        Self(record)
    }

    pub fn record(&self) -> &ProofRecord {
        &self.0
    }

    /// A fresh, independently owned copy of the original values.
    pub fn to_record(&self) -> ProofRecord {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ProofRecord {
        ProofRecord::new(
            "https://api.stripe.com/webhook",
            "2024-01-15T10:30:45Z",
            "200",
            "3b7e72d4a8f9e1c2...",
        )
    }

    #[test]
    fn test_field_from_str() {
        assert_eq!("url".parse::<Field>().unwrap(), Field::Url);
        assert_eq!("timestamp".parse::<Field>().unwrap(), Field::Timestamp);
        assert_eq!("status".parse::<Field>().unwrap(), Field::Status);
        assert_eq!("hash".parse::<Field>().unwrap(), Field::Hash);
    }

    #[test]
    fn test_field_from_str_unknown() {
        let err = "URL".parse::<Field>().unwrap_err();
        assert!(matches!(err, PMError::UnknownField(name) if name == "URL"));
        assert!("body".parse::<Field>().is_err());
    }

    #[test]
    fn test_field_display_roundtrip() {
        for field in Field::ALL {
            assert_eq!(field.to_string().parse::<Field>().unwrap(), field);
        }
    }

    #[test]
    fn test_set_and_get() {
        let mut record = sample();
        record.set(Field::Status, "500");
        assert_eq!(record.get(Field::Status), "500");
        assert_eq!(record.status, "500");
        assert_eq!(record.get(Field::Url), "https://api.stripe.com/webhook");
    }

    #[test]
    fn test_values_in_canonical_order() {
        let record = sample();
        assert_eq!(
            record.values(),
            [
                "https://api.stripe.com/webhook",
                "2024-01-15T10:30:45Z",
                "200",
                "3b7e72d4a8f9e1c2...",
            ]
        );
    }

    #[test]
    fn test_original_record_copy_is_independent() {
        let original = OriginalRecord::new(sample());
        let mut copy = original.to_record();
        copy.set(Field::Hash, "");
        assert_eq!(original.record().hash, "3b7e72d4a8f9e1c2...");
        assert_ne!(&copy, original.record());
    }

    #[test]
    fn test_record_json() {
        let record = sample();
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"status\":\"200\""));
        let parsed: ProofRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }
}
