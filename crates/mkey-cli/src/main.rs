#![doc = include_str!("../README.md")]

mod app;

use app::command::run;
use app::config::{CliArgs, CliConfig};
use app::telemetry::init_telemetry;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    init_telemetry(args.log_format)?;

    let config = CliConfig::try_from(args)?;
    if cfg!(debug_assertions) {
        tracing::debug!("Running with full config: {:#?}", config);
    }

    run(&config, &mut std::io::stdout().lock())
}
