//! Fraud Rules Pipeline Library
//!
//! Generates synthetic transactions, screens them against static threshold
//! rules across a fixed pool of parallel workers, and merges the flagged
//! results through a single channel.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod generator;
pub mod logging;
pub mod metrics;
pub mod rules;
pub mod types;

pub use config::AppConfig;
pub use dispatcher::{DispatchReport, Dispatcher};
pub use error::{DetectionError, DetectionResult};
pub use generator::{generate_transactions, TransactionGenerator};
pub use rules::{evaluate, Screen, Verdict};
pub use types::{
    alert::{FlaggedResult, RuleOutcomes},
    transaction::{Location, Transaction, TransactionRecord},
};
