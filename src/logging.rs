//! Tracing subscriber setup shared by the binaries

use crate::config::{LogFormat, LoggingConfig};
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber described by `config`.
///
/// `RUST_LOG` still applies; `target` gets `config.level` on top of it.
pub fn init(config: &LoggingConfig, target: &str) -> Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("{}={}", target, config.level).parse()?);

    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match (&config.file, config.format) {
        (Some(path), format) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path))?;
            let builder = builder.with_writer(Mutex::new(file)).with_ansi(false);
            match format {
                LogFormat::Json => builder.json().init(),
                LogFormat::Pretty => builder.init(),
            }
        }
        (None, format) => {
            let builder = builder.with_writer(std::io::stderr);
            match format {
                LogFormat::Json => builder.json().init(),
                LogFormat::Pretty => builder.init(),
            }
        }
    }

    Ok(())
}
