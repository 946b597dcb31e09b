//! Fraud Rules Pipeline - Main Entry Point
//!
//! Generates a synthetic batch, screens it across parallel workers, and prints
//! the flagged transactions.

use anyhow::Result;
use fraud_rules_pipeline::{
    config::{AppConfig, DEFAULT_CONFIG_PATH},
    logging,
    metrics::PipelineMetrics,
    Dispatcher, TransactionGenerator,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Optional config path as the first argument
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = AppConfig::load_from_path(&config_path)?;

    logging::init(&config.logging, "fraud_rules_pipeline")?;

    info!("Starting Fraud Rules Pipeline");
    if config.source.is_none() {
        info!(path = %config_path, "Config file not found, using defaults");
    }
    info!(
        path = %config_path,
        transactions = config.generator.transactions,
        workers = config.pipeline.workers,
        "Configuration loaded"
    );

    let metrics = Arc::new(PipelineMetrics::new());

    let transactions = TransactionGenerator::new().generate(config.generator.transactions);
    info!(count = transactions.len(), "Generated transactions");

    let start = Instant::now();
    let dispatcher = Dispatcher::new(config.pipeline.workers).with_metrics(metrics.clone());
    let report = dispatcher.run(transactions).await;
    info!(
        elapsed_us = start.elapsed().as_micros() as u64,
        "Screening finished"
    );

    println!(
        "Detected {} fraudulent transactions:",
        report.results.len()
    );
    for result in &report.results {
        println!("{}", serde_json::to_string(result)?);
        info!(
            transaction_id = result.transaction_id,
            rules = ?result.rules_triggered.triggered(),
            "Flagged transaction"
        );
    }

    metrics.print_summary();

    Ok(())
}
