//! Test Transaction Generator
//!
//! Prints a synthetic batch as JSON for inspecting what the pipeline screens.
//!
//! Usage: generate-transactions [count] [--pretty] [--seed N] [--base-time SECS]
//!
//! With `--seed`, timestamps start at `--base-time` (default 0) instead of the
//! current time, so the whole batch is reproducible.

use anyhow::{bail, Context, Result};
use fraud_rules_pipeline::{logging, AppConfig, Transaction, TransactionGenerator};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{self, BufWriter, Write};
use tracing::info;

#[derive(Debug, PartialEq)]
struct Args {
    count: usize,
    pretty: bool,
    seed: Option<u64>,
    base_time: Option<f64>,
}

fn parse_args<I>(raw: I) -> Result<Args>
where
    I: IntoIterator<Item = String>,
{
    let mut args = Args {
        count: AppConfig::default().generator.transactions,
        pretty: false,
        seed: None,
        base_time: None,
    };

    let mut iter = raw.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--pretty" => args.pretty = true,
            "--seed" => {
                let value = iter.next().context("--seed needs a value")?;
                args.seed = Some(value.parse().context("invalid --seed")?);
            }
            "--base-time" => {
                let value = iter.next().context("--base-time needs a value")?;
                args.base_time = Some(value.parse().context("invalid --base-time")?);
            }
            other if !other.starts_with('-') => {
                args.count = other.parse().context("invalid count")?;
            }
            other => bail!("unknown argument: {}", other),
        }
    }

    Ok(args)
}

fn generate(args: &Args) -> Vec<Transaction> {
    match (args.seed, args.base_time) {
        (Some(seed), base_time) => TransactionGenerator::with_rng(StdRng::seed_from_u64(seed))
            .generate_from(args.count, base_time.unwrap_or(0.0)),
        (None, Some(base_time)) => TransactionGenerator::new().generate_from(args.count, base_time),
        (None, None) => TransactionGenerator::new().generate(args.count),
    }
}

fn write_batch(batch: &[Transaction], pretty: bool) -> Result<()> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if pretty {
        serde_json::to_writer_pretty(&mut out, batch)?;
        writeln!(out)?;
    } else {
        for tx in batch {
            serde_json::to_writer(&mut out, tx)?;
            writeln!(out)?;
        }
    }

    out.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays pure JSON
    logging::init(&AppConfig::default().logging, "generate_transactions")?;

    let args = parse_args(std::env::args().skip(1))?;
    info!(
        count = args.count,
        seed = ?args.seed,
        base_time = ?args.base_time,
        "Generating transactions"
    );

    let batch = generate(&args);
    write_batch(&batch, args.pretty)?;

    let flagged = batch
        .iter()
        .filter(|tx| fraud_rules_pipeline::evaluate(tx).is_flagged)
        .count();
    info!(
        generated = batch.len(),
        would_flag = flagged,
        "Completed"
    );

    Ok(())
}
