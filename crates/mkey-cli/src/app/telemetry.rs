//! Log output for the `mkey` binary.
//!
//! Events are written to stderr so that stdout carries nothing but IDs and
//! decode reports. Filtering comes from `RUST_LOG` and defaults to `info`;
//! `RUST_LOG=mkey=trace` also shows the generator's per-call spans and clock
//! waits.

use clap::ValueEnum;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// How log events are rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Single-line human-readable events.
    #[default]
    Text,
    /// Multi-line events with source locations.
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Fails if a global subscriber has already been installed.
pub fn init_telemetry(format: LogFormat) -> anyhow::Result<()> {
    let registry = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()));
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    match format {
        LogFormat::Text => registry.with(layer.compact()).try_init()?,
        LogFormat::Pretty => registry
            .with(
                layer
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .pretty(),
            )
            .try_init()?,
        LogFormat::Json => registry.with(layer.json()).try_init()?,
    }

    Ok(())
}
