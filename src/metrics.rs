//! Run statistics for the fraud rules pipeline.
//!
//! Only the collecting side records into these counters, so workers never
//! touch shared state.

use crate::types::alert::{FlaggedResult, RuleOutcomes};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector for a dispatch run
pub struct PipelineMetrics {
    /// Records handed to workers
    pub records_dispatched: AtomicU64,
    /// Tail records left out by partitioning
    pub records_dropped: AtomicU64,
    /// Flagged results collected
    pub results_flagged: AtomicU64,
    /// Workers that reported a failure
    pub workers_failed: AtomicU64,
    /// Hits per rule name
    rule_hits: RwLock<HashMap<&'static str, u64>>,
    /// Worker wall times (in microseconds)
    worker_times: RwLock<Vec<u64>>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            records_dispatched: AtomicU64::new(0),
            records_dropped: AtomicU64::new(0),
            results_flagged: AtomicU64::new(0),
            workers_failed: AtomicU64::new(0),
            rule_hits: RwLock::new(HashMap::new()),
            worker_times: RwLock::new(Vec::new()),
            start_time: Instant::now(),
        }
    }

    /// Record how a batch was partitioned
    pub fn record_partition(&self, dispatched: usize, dropped: usize) {
        self.records_dispatched
            .fetch_add(dispatched as u64, Ordering::Relaxed);
        self.records_dropped.fetch_add(dropped as u64, Ordering::Relaxed);
    }

    /// Record a worker's flagged results
    pub fn record_results(&self, results: &[FlaggedResult], elapsed: Duration) {
        self.results_flagged
            .fetch_add(results.len() as u64, Ordering::Relaxed);

        if let Ok(mut hits) = self.rule_hits.write() {
            for result in results {
                for name in result.rules_triggered.triggered() {
                    *hits.entry(name).or_insert(0) += 1;
                }
            }
        }

        self.record_worker_time(elapsed);
    }

    /// Record a worker that degraded to an empty result
    pub fn record_failure(&self, elapsed: Duration) {
        self.workers_failed.fetch_add(1, Ordering::Relaxed);
        self.record_worker_time(elapsed);
    }

    fn record_worker_time(&self, elapsed: Duration) {
        if let Ok(mut times) = self.worker_times.write() {
            times.push(elapsed.as_micros() as u64);
        }
    }

    /// Hits per rule, including rules that never fired
    pub fn get_rule_hits(&self) -> HashMap<&'static str, u64> {
        let mut all: HashMap<&'static str, u64> =
            RuleOutcomes::RULE_NAMES.iter().map(|&name| (name, 0)).collect();
        if let Ok(hits) = self.rule_hits.read() {
            all.extend(hits.iter().map(|(&name, &count)| (name, count)));
        }
        all
    }

    /// Worker latency statistics
    pub fn get_worker_stats(&self) -> WorkerStats {
        let sorted = match self.worker_times.read() {
            Ok(times) if !times.is_empty() => {
                let mut sorted = times.clone();
                sorted.sort_unstable();
                sorted
            }
            _ => return WorkerStats::default(),
        };

        let count = sorted.len();
        WorkerStats {
            count: count as u64,
            mean_us: sorted.iter().sum::<u64>() / count as u64,
            p50_us: sorted[count / 2],
            max_us: sorted[count - 1],
        }
    }

    /// Dispatched records per second since the collector was created
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.records_dispatched.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let dispatched = self.records_dispatched.load(Ordering::Relaxed);
        let dropped = self.records_dropped.load(Ordering::Relaxed);
        let flagged = self.results_flagged.load(Ordering::Relaxed);
        let failed = self.workers_failed.load(Ordering::Relaxed);
        let flag_rate = if dispatched > 0 {
            (flagged as f64 / dispatched as f64) * 100.0
        } else {
            0.0
        };
        let workers = self.get_worker_stats();

        info!(
            dispatched,
            dropped,
            flagged,
            flag_rate = format!("{:.1}%", flag_rate),
            throughput = format!("{:.1} tx/s", self.get_throughput()),
            "Run summary"
        );
        info!(
            workers = workers.count,
            failed,
            mean_us = workers.mean_us,
            p50_us = workers.p50_us,
            max_us = workers.max_us,
            "Worker timings"
        );

        let hits = self.get_rule_hits();
        for name in RuleOutcomes::RULE_NAMES {
            let count = hits.get(name).copied().unwrap_or(0);
            let pct = if flagged > 0 {
                (count as f64 / flagged as f64) * 100.0
            } else {
                0.0
            };
            info!(rule = name, hits = count, share = format!("{:.1}%", pct), "Rule hits");
        }
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Worker latency statistics
#[derive(Debug, Default)]
pub struct WorkerStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub max_us: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flagged(id: u64, large: bool, location: bool) -> FlaggedResult {
        FlaggedResult::new(
            id,
            RuleOutcomes {
                large_amount: large,
                rapid_transaction: false,
                unusual_location: location,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_metrics_recording() {
        let metrics = PipelineMetrics::new();

        metrics.record_partition(8, 2);
        metrics.record_results(
            &[flagged(0, true, false), flagged(3, true, true)],
            Duration::from_micros(100),
        );
        metrics.record_failure(Duration::from_micros(300));

        assert_eq!(metrics.records_dispatched.load(Ordering::Relaxed), 8);
        assert_eq!(metrics.records_dropped.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.results_flagged.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.workers_failed.load(Ordering::Relaxed), 1);

        let hits = metrics.get_rule_hits();
        assert_eq!(hits["large_amount"], 2);
        assert_eq!(hits["unusual_location"], 1);
        assert_eq!(hits["rapid_transaction"], 0);
    }

    #[test]
    fn test_worker_stats() {
        let metrics = PipelineMetrics::new();
        assert_eq!(metrics.get_worker_stats().count, 0);

        metrics.record_results(&[], Duration::from_micros(100));
        metrics.record_results(&[], Duration::from_micros(300));

        let stats = metrics.get_worker_stats();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.mean_us, 200);
        assert_eq!(stats.max_us, 300);
    }
}
