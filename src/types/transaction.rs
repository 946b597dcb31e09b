//! Transaction data structures for rule-based fraud screening

use crate::error::{DetectionError, DetectionResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Location codes a synthetic transaction can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Location {
    Ny,
    Ca,
    Tx,
    Fl,
    Nv,
}

impl Location {
    /// Every location, in the order the generator draws from
    pub const ALL: [Location; 5] = [
        Location::Ny,
        Location::Ca,
        Location::Tx,
        Location::Fl,
        Location::Nv,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Location::Ny => "NY",
            Location::Ca => "CA",
            Location::Tx => "TX",
            Location::Fl => "FL",
            Location::Nv => "NV",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A synthetic transaction. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Sequence index within the generated batch
    pub transaction_id: u64,

    /// Account identifier
    pub account_id: u32,

    /// Transaction amount
    pub amount: f64,

    /// Location code
    pub location: Location,

    /// Seconds since the Unix epoch
    pub timestamp: f64,
}

impl Transaction {
    /// Create a new transaction
    pub fn new(
        transaction_id: u64,
        account_id: u32,
        amount: f64,
        location: Location,
        timestamp: f64,
    ) -> Self {
        Self {
            transaction_id,
            account_id,
            amount,
            location,
            timestamp,
        }
    }
}

/// Loosely-typed transaction as it arrives over the wire.
///
/// Any field may be absent; converting into a [`Transaction`] reports the
/// first missing key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
}

fn required<T>(value: Option<T>, field: &'static str) -> DetectionResult<T> {
    value.ok_or(DetectionError::MissingField(field))
}

impl TryFrom<&TransactionRecord> for Transaction {
    type Error = DetectionError;

    fn try_from(record: &TransactionRecord) -> DetectionResult<Self> {
        Ok(Transaction {
            transaction_id: required(record.transaction_id, "transaction_id")?,
            account_id: required(record.account_id, "account_id")?,
            amount: required(record.amount, "amount")?,
            location: required(record.location, "location")?,
            timestamp: required(record.timestamp, "timestamp")?,
        })
    }
}

impl From<&Transaction> for TransactionRecord {
    fn from(tx: &Transaction) -> Self {
        Self {
            transaction_id: Some(tx.transaction_id),
            account_id: Some(tx.account_id),
            amount: Some(tx.amount),
            location: Some(tx.location),
            timestamp: Some(tx.timestamp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_serialization() {
        let tx = Transaction::new(7, 1500, 250.0, Location::Tx, 1_678_886_401.5);

        let json = serde_json::to_string(&tx).unwrap();
        assert!(json.contains("\"location\":\"TX\""));

        let deserialized: Transaction = serde_json::from_str(&json).unwrap();
        assert_eq!(tx, deserialized);
    }

    #[test]
    fn test_record_conversion_reports_missing_field() {
        let json = r#"{"transaction_id": 1, "account_id": 1001, "amount": 100.0, "location": "NY"}"#;
        let record: TransactionRecord = serde_json::from_str(json).unwrap();

        let err = Transaction::try_from(&record).unwrap_err();
        assert!(matches!(err, DetectionError::MissingField("timestamp")));
    }

    #[test]
    fn test_record_conversion_reports_first_missing_field() {
        let record = TransactionRecord {
            transaction_id: Some(3),
            ..Default::default()
        };

        let err = Transaction::try_from(&record).unwrap_err();
        assert!(matches!(err, DetectionError::MissingField("account_id")));
    }

    #[test]
    fn test_complete_record_converts() {
        let tx = Transaction::new(2, 1999, 4500.0, Location::Nv, 1_700_000_000.0);
        let record = TransactionRecord::from(&tx);

        assert_eq!(Transaction::try_from(&record).unwrap(), tx);
    }

    #[test]
    fn test_location_codes() {
        let codes: Vec<&str> = Location::ALL.iter().map(Location::code).collect();
        assert_eq!(codes, ["NY", "CA", "TX", "FL", "NV"]);
        assert_eq!(Location::Nv.to_string(), "NV");
    }
}
