//! Parallel dispatcher: fans a batch out to a fixed pool of workers and fans
//! their flagged results back in through a single channel.
//!
//! Partitioning uses `len / workers` as the chunk size, so the `len % workers`
//! tail records are never screened. Each worker sends exactly one report; a
//! worker that hits any evaluation error reports an empty list for its whole
//! chunk.

use crate::error::DetectionError;
use crate::metrics::PipelineMetrics;
use crate::rules::Screen;
use crate::types::alert::FlaggedResult;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Worker count used when none is configured
pub const DEFAULT_WORKERS: usize = 4;

/// Lifecycle of a single dispatch run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPhase {
    Idle,
    Partitioned,
    Dispatched,
    Collecting,
    Joined,
    Done,
}

/// A batch split into per-worker chunks
#[derive(Debug)]
pub struct Partition<T> {
    pub chunks: Vec<Vec<T>>,
    /// Tail records no worker receives
    pub dropped: Vec<T>,
}

impl<T> Partition<T> {
    pub fn dispatched_len(&self) -> usize {
        self.chunks.iter().map(Vec::len).sum()
    }
}

/// Chunk size for `len` records over `workers` workers
pub fn chunk_size(len: usize, workers: usize) -> usize {
    if workers == 0 {
        0
    } else {
        len / workers
    }
}

/// Split `records` into `workers` contiguous chunks of `len / workers` records.
pub fn partition<T>(records: Vec<T>, workers: usize) -> Partition<T> {
    let size = chunk_size(records.len(), workers);
    let mut iter = records.into_iter();

    let chunks = (0..workers)
        .map(|_| iter.by_ref().take(size).collect())
        .collect();

    Partition {
        chunks,
        dropped: iter.collect(),
    }
}

/// What a worker hands back for its chunk
#[derive(Debug)]
pub enum WorkerOutcome {
    Completed(Vec<FlaggedResult>),
    Failed(DetectionError),
}

/// The single unit each worker pushes onto the result channel
#[derive(Debug)]
pub struct WorkerReport {
    pub worker: usize,
    pub outcome: WorkerOutcome,
    pub elapsed: Duration,
}

/// Screen one chunk in order, keeping only flagged results.
///
/// Any error, including a panic inside evaluation, turns into
/// [`WorkerOutcome::Failed`] for the whole chunk.
pub fn screen_chunk<T: Screen>(worker: usize, chunk: &[T]) -> WorkerOutcome {
    let screened = panic::catch_unwind(AssertUnwindSafe(|| {
        chunk
            .iter()
            .map(|record| record.screen().map(|verdict| verdict.into_flagged()))
            .filter_map(Result::transpose)
            .collect::<Result<Vec<_>, _>>()
    }));

    match screened {
        Ok(Ok(flagged)) => WorkerOutcome::Completed(flagged),
        Ok(Err(e)) => {
            WorkerOutcome::Failed(DetectionError::worker_failure(worker, e.to_string()))
        }
        Err(payload) => WorkerOutcome::Failed(DetectionError::worker_failure(
            worker,
            panic_message(payload.as_ref()),
        )),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", msg)
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("panicked: {}", msg)
    } else {
        "panicked".to_string()
    }
}

/// Everything a dispatch run produced
#[derive(Debug)]
pub struct DispatchReport {
    /// Flagged results in channel-arrival order
    pub results: Vec<FlaggedResult>,
    /// Records handed to workers
    pub dispatched: usize,
    /// Tail records left out by partitioning
    pub dropped: usize,
    /// Workers whose chunk degraded to an empty result
    pub failed_workers: Vec<usize>,
    /// Worker reports actually received
    pub reports_received: usize,
    pub phase: DispatchPhase,
}

impl DispatchReport {
    fn empty() -> Self {
        Self {
            results: Vec::new(),
            dispatched: 0,
            dropped: 0,
            failed_workers: Vec::new(),
            reports_received: 0,
            phase: DispatchPhase::Idle,
        }
    }

    fn advance(&mut self, phase: DispatchPhase) {
        debug!(from = ?self.phase, to = ?phase, "Dispatch phase");
        self.phase = phase;
    }
}

/// Fans screening out over a fixed number of blocking workers
#[derive(Clone)]
pub struct Dispatcher {
    workers: usize,
    metrics: Option<Arc<PipelineMetrics>>,
}

impl Dispatcher {
    pub fn new(workers: usize) -> Self {
        Self {
            workers,
            metrics: None,
        }
    }

    /// Record run statistics into `metrics`
    pub fn with_metrics(mut self, metrics: Arc<PipelineMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Screen `records` and return the merged flagged results
    pub async fn dispatch<T>(&self, records: Vec<T>) -> Vec<FlaggedResult>
    where
        T: Screen + Send + 'static,
    {
        self.run(records).await.results
    }

    /// Screen `records` and return the merged results with run bookkeeping.
    ///
    /// Never fails: worker and collection errors are logged and shrink the
    /// result list instead.
    pub async fn run<T>(&self, records: Vec<T>) -> DispatchReport
    where
        T: Screen + Send + 'static,
    {
        let mut report = DispatchReport::empty();

        if self.workers == 0 {
            warn!(records = records.len(), "Dispatch requested with zero workers");
            report.dropped = records.len();
            report.advance(DispatchPhase::Done);
            return report;
        }

        let partition = partition(records, self.workers);
        report.dispatched = partition.dispatched_len();
        report.dropped = partition.dropped.len();
        report.advance(DispatchPhase::Partitioned);
        debug!(
            workers = self.workers,
            chunk_size = chunk_size(report.dispatched + report.dropped, self.workers),
            dispatched = report.dispatched,
            dropped = report.dropped,
            "Batch partitioned"
        );

        if report.dropped > 0 {
            debug!(dropped = report.dropped, "Tail records not assigned to any worker");
        }
        if let Some(metrics) = &self.metrics {
            metrics.record_partition(report.dispatched, report.dropped);
        }

        let (tx, rx) = mpsc::unbounded_channel::<WorkerReport>();
        let handles: Vec<_> = partition
            .chunks
            .into_iter()
            .enumerate()
            .map(|(worker, chunk)| {
                let tx = tx.clone();
                tokio::task::spawn_blocking(move || {
                    let start = Instant::now();
                    let outcome = screen_chunk(worker, &chunk);
                    let unit = WorkerReport {
                        worker,
                        outcome,
                        elapsed: start.elapsed(),
                    };
                    if tx.send(unit).is_err() {
                        warn!(worker, "Result channel closed before report was sent");
                    }
                })
            })
            .collect();
        drop(tx);
        report.advance(DispatchPhase::Dispatched);

        self.finish(rx, handles, report).await
    }

    /// Drain exactly `workers` reports in arrival order, join every handle,
    /// and close out the run.
    ///
    /// A channel that closes early is logged as a collection failure and the
    /// results gathered so far are kept.
    async fn finish(
        &self,
        mut rx: mpsc::UnboundedReceiver<WorkerReport>,
        handles: Vec<JoinHandle<()>>,
        mut report: DispatchReport,
    ) -> DispatchReport {
        report.advance(DispatchPhase::Collecting);
        for received in 0..self.workers {
            let Some(unit) = rx.recv().await else {
                let e = DetectionError::CollectionFailure {
                    received,
                    expected: self.workers,
                };
                warn!(error = %e, "Returning partial results");
                break;
            };
            report.reports_received += 1;
            self.collect(unit, &mut report);
        }

        for (worker, handle) in handles.into_iter().enumerate() {
            if let Err(e) = handle.await {
                error!(worker, error = %e, "Worker did not finish cleanly");
            }
        }
        report.advance(DispatchPhase::Joined);

        report.advance(DispatchPhase::Done);
        info!(
            dispatched = report.dispatched,
            flagged = report.results.len(),
            failed_workers = report.failed_workers.len(),
            "Dispatch complete"
        );
        report
    }

    fn collect(&self, unit: WorkerReport, report: &mut DispatchReport) {
        match unit.outcome {
            WorkerOutcome::Completed(mut flagged) => {
                debug!(
                    worker = unit.worker,
                    flagged = flagged.len(),
                    elapsed_us = unit.elapsed.as_micros() as u64,
                    "Worker report received"
                );
                if let Some(metrics) = &self.metrics {
                    metrics.record_results(&flagged, unit.elapsed);
                }
                report.results.append(&mut flagged);
            }
            WorkerOutcome::Failed(e) => {
                error!(
                    worker = unit.worker,
                    error = %e,
                    "Worker evaluation failed, chunk discarded"
                );
                if let Some(metrics) = &self.metrics {
                    metrics.record_failure(unit.elapsed);
                }
                report.failed_workers.push(unit.worker);
            }
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(DEFAULT_WORKERS)
    }
}
