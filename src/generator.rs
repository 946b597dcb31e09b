//! Synthetic transaction generation

use crate::types::transaction::{Location, Transaction};
use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use std::ops::{Range, RangeInclusive};

/// Account identifiers are drawn from this range
pub const ACCOUNT_ID_RANGE: RangeInclusive<u32> = 1000..=2000;

/// Amounts are drawn from this range
pub const AMOUNT_RANGE: Range<f64> = 10.0..5000.0;

/// Generates batches of synthetic transactions
pub struct TransactionGenerator<R: Rng> {
    rng: R,
}

impl TransactionGenerator<rand::rngs::ThreadRng> {
    /// Generator backed by the thread-local RNG
    pub fn new() -> Self {
        Self::with_rng(rand::thread_rng())
    }
}

impl Default for TransactionGenerator<rand::rngs::ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> TransactionGenerator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Generate `count` transactions stamped from the current time
    pub fn generate(&mut self, count: usize) -> Vec<Transaction> {
        let base_time = Utc::now().timestamp_micros() as f64 / 1_000_000.0;
        self.generate_from(count, base_time)
    }

    /// Generate `count` transactions; record `i` is stamped `base_time + i`
    pub fn generate_from(&mut self, count: usize, base_time: f64) -> Vec<Transaction> {
        (0..count)
            .map(|i| {
                Transaction::new(
                    i as u64,
                    self.rng.gen_range(ACCOUNT_ID_RANGE),
                    self.rng.gen_range(AMOUNT_RANGE),
                    self.random_location(),
                    base_time + i as f64,
                )
            })
            .collect()
    }

    fn random_location(&mut self) -> Location {
        *Location::ALL
            .choose(&mut self.rng)
            .unwrap_or(&Location::Ny)
    }
}

/// Generate `count` transactions with the thread RNG and the current time
pub fn generate_transactions(count: usize) -> Vec<Transaction> {
    TransactionGenerator::new().generate(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_generates_exact_count_with_sequential_ids() {
        for count in [0, 1, 10, 257] {
            let txs = generate_transactions(count);
            assert_eq!(txs.len(), count);
            for (i, tx) in txs.iter().enumerate() {
                assert_eq!(tx.transaction_id, i as u64);
            }
        }
    }

    #[test]
    fn test_fields_within_ranges() {
        let mut generator = TransactionGenerator::with_rng(StdRng::seed_from_u64(7));
        let txs = generator.generate(500);

        for tx in &txs {
            assert!(ACCOUNT_ID_RANGE.contains(&tx.account_id));
            assert!(AMOUNT_RANGE.contains(&tx.amount));
            assert!(Location::ALL.contains(&tx.location));
        }

        let seen: HashSet<Location> = txs.iter().map(|tx| tx.location).collect();
        assert_eq!(seen.len(), Location::ALL.len());
    }

    #[test]
    fn test_timestamps_strictly_increasing() {
        let txs = generate_transactions(100);
        for pair in txs.windows(2) {
            assert!(pair[1].timestamp > pair[0].timestamp);
        }
    }

    #[test]
    fn test_timestamp_is_base_plus_index() {
        let mut generator = TransactionGenerator::with_rng(StdRng::seed_from_u64(1));
        let txs = generator.generate_from(5, 1_678_886_400.0);

        let stamps: Vec<f64> = txs.iter().map(|tx| tx.timestamp).collect();
        assert_eq!(
            stamps,
            vec![
                1_678_886_400.0,
                1_678_886_401.0,
                1_678_886_402.0,
                1_678_886_403.0,
                1_678_886_404.0
            ]
        );
    }

    #[test]
    fn test_seeded_generator_is_reproducible() {
        let a = TransactionGenerator::with_rng(StdRng::seed_from_u64(99)).generate_from(20, 0.0);
        let b = TransactionGenerator::with_rng(StdRng::seed_from_u64(99)).generate_from(20, 0.0);
        assert_eq!(a, b);
    }
}
