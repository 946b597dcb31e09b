//! Static threshold rules for transaction screening.
//!
//! Evaluation is pure: the same transaction always yields the same verdict.

use crate::error::DetectionResult;
use crate::types::alert::{FlaggedResult, RuleOutcomes};
use crate::types::transaction::{Location, Transaction, TransactionRecord};

/// Amounts strictly above this trip `large_amount`
pub const LARGE_AMOUNT_THRESHOLD: f64 = 4000.0;

/// Truncated timestamps divisible by this trip `rapid_transaction`.
/// Placeholder for a velocity check; it does not look at transaction rate.
pub const RAPID_TIMESTAMP_MODULUS: f64 = 10.0;

/// Location that trips `unusual_location`
pub const UNUSUAL_LOCATION: Location = Location::Nv;

/// Verdict for a single transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub transaction_id: u64,
    pub is_flagged: bool,
    pub rules: RuleOutcomes,
}

impl Verdict {
    /// Convert into a flagged result, if any rule fired
    pub fn into_flagged(self) -> Option<FlaggedResult> {
        FlaggedResult::new(self.transaction_id, self.rules)
    }
}

/// Run every rule against a transaction
pub fn evaluate(tx: &Transaction) -> Verdict {
    let rules = RuleOutcomes {
        large_amount: tx.amount > LARGE_AMOUNT_THRESHOLD,
        rapid_transaction: tx.timestamp.trunc() % RAPID_TIMESTAMP_MODULUS == 0.0,
        unusual_location: tx.location == UNUSUAL_LOCATION,
    };

    Verdict {
        transaction_id: tx.transaction_id,
        is_flagged: rules.any(),
        rules,
    }
}

/// Anything the dispatcher can screen
pub trait Screen {
    fn screen(&self) -> DetectionResult<Verdict>;
}

impl Screen for Transaction {
    fn screen(&self) -> DetectionResult<Verdict> {
        Ok(evaluate(self))
    }
}

impl Screen for TransactionRecord {
    fn screen(&self) -> DetectionResult<Verdict> {
        let tx = Transaction::try_from(self)?;
        Ok(evaluate(&tx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DetectionError;

    // Not divisible by 10 once truncated.
    const QUIET_TIMESTAMP: f64 = 1_678_886_405.25;

    fn tx(amount: f64, location: Location, timestamp: f64) -> Transaction {
        Transaction::new(1, 1001, amount, location, timestamp)
    }

    #[test]
    fn test_large_amount() {
        let verdict = evaluate(&tx(5000.0, Location::Ny, QUIET_TIMESTAMP));
        assert!(verdict.is_flagged);
        assert!(verdict.rules.large_amount);
        assert!(!verdict.rules.rapid_transaction);
        assert!(!verdict.rules.unusual_location);
    }

    #[test]
    fn test_large_amount_threshold_is_exclusive() {
        let verdict = evaluate(&tx(4000.0, Location::Ny, QUIET_TIMESTAMP));
        assert!(!verdict.rules.large_amount);
    }

    #[test]
    fn test_rapid_transaction() {
        let verdict = evaluate(&tx(100.0, Location::Ny, 1_678_886_400.0));
        assert!(verdict.is_flagged);
        assert!(verdict.rules.rapid_transaction);
    }

    #[test]
    fn test_rapid_transaction_truncates_fraction() {
        let verdict = evaluate(&tx(100.0, Location::Ny, 1_678_886_400.9));
        assert!(verdict.rules.rapid_transaction);
    }

    #[test]
    fn test_rapid_transaction_beyond_integer_range() {
        let verdict = evaluate(&tx(100.0, Location::Ny, 1e20));
        assert!(verdict.rules.rapid_transaction);

        let verdict = evaluate(&tx(100.0, Location::Ny, 1e20 + 65536.0 * 3.0));
        assert!(!verdict.rules.rapid_transaction);
    }

    #[test]
    fn test_unusual_location() {
        let verdict = evaluate(&tx(100.0, Location::Nv, QUIET_TIMESTAMP));
        assert!(verdict.is_flagged);
        assert!(verdict.rules.unusual_location);
    }

    #[test]
    fn test_no_fraud() {
        let verdict = evaluate(&tx(100.0, Location::Ny, QUIET_TIMESTAMP));
        assert!(!verdict.is_flagged);
        assert_eq!(verdict.rules, RuleOutcomes::default());
        assert!(verdict.into_flagged().is_none());
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let t = tx(4200.0, Location::Fl, 1_678_886_410.0);
        assert_eq!(evaluate(&t), evaluate(&t));
    }

    #[test]
    fn test_verdict_keeps_transaction_id() {
        let t = Transaction::new(42, 1500, 100.0, Location::Nv, QUIET_TIMESTAMP);
        let flagged = evaluate(&t).into_flagged().unwrap();
        assert_eq!(flagged.transaction_id, 42);
    }

    #[test]
    fn test_record_missing_field_propagates() {
        let record = TransactionRecord {
            transaction_id: Some(1),
            account_id: Some(1001),
            location: Some(Location::Nv),
            timestamp: Some(QUIET_TIMESTAMP),
            ..Default::default()
        };

        let err = record.screen().unwrap_err();
        assert!(matches!(err, DetectionError::MissingField("amount")));
    }

    #[test]
    fn test_record_and_transaction_agree() {
        let t = tx(4500.0, Location::Ca, QUIET_TIMESTAMP);
        let record = TransactionRecord::from(&t);
        assert_eq!(record.screen().unwrap(), t.screen().unwrap());
    }
}
