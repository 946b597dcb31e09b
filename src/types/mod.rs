//! Type definitions for the fraud rules pipeline

pub mod alert;
pub mod transaction;

pub use alert::{FlaggedResult, RuleOutcomes};
pub use transaction::{Location, Transaction, TransactionRecord};
