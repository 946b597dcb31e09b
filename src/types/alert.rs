//! Rule outcomes and flagged-result data structures

use serde::{Deserialize, Serialize};

/// Outcome of each screening rule for one transaction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleOutcomes {
    pub large_amount: bool,
    pub rapid_transaction: bool,
    pub unusual_location: bool,
}

impl RuleOutcomes {
    /// Rule names, in evaluation order
    pub const RULE_NAMES: [&'static str; 3] =
        ["large_amount", "rapid_transaction", "unusual_location"];

    /// True when at least one rule fired
    pub fn any(&self) -> bool {
        self.large_amount || self.rapid_transaction || self.unusual_location
    }

    /// Pairs of rule name and outcome
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, bool)> {
        Self::RULE_NAMES.into_iter().zip([
            self.large_amount,
            self.rapid_transaction,
            self.unusual_location,
        ])
    }

    /// Names of the rules that fired
    pub fn triggered(&self) -> Vec<&'static str> {
        self.iter()
            .filter_map(|(name, hit)| hit.then_some(name))
            .collect()
    }
}

/// A transaction that tripped at least one rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlaggedResult {
    /// Index of the flagged transaction
    pub transaction_id: u64,

    /// Rule outcomes that caused the flag
    pub rules_triggered: RuleOutcomes,
}

impl FlaggedResult {
    /// Build a flagged result; returns `None` when no rule fired
    pub fn new(transaction_id: u64, rules_triggered: RuleOutcomes) -> Option<Self> {
        rules_triggered.any().then_some(Self {
            transaction_id,
            rules_triggered,
        })
    }
}
