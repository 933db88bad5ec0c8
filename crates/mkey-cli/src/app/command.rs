use core::fmt;
use std::io::Write;

use anyhow::{Context, bail};
use mkey::{Encoding, Generator, Id, Layout};
use serde::Serialize;

use super::config::{CliConfig, Command};

/// Executes the configured subcommand, writing its report to `out`.
///
/// # Errors
///
/// Fails on invalid input, on a generator error or if `out` cannot be written.
pub fn run(config: &CliConfig, out: &mut impl Write) -> anyhow::Result<()> {
    match &config.command {
        Command::Generate {
            count,
            batch,
            format,
        } => generate(config, *count, *batch, (*format).into(), out),
        Command::Decode {
            value,
            format,
            json,
        } => decode(&config.layout, value, (*format).into(), *json, out),
        Command::RandomNode => {
            writeln!(out, "{}", config.layout.random_node_id()?)?;
            Ok(())
        }
    }
}

fn generate(
    config: &CliConfig,
    count: usize,
    batch: bool,
    encoding: Encoding,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    if count == 0 {
        bail!("--count must be greater than 0");
    }

    let generator = Generator::with_config(config.config)?;
    tracing::info!(node = generator.node(), count, batch, %encoding, "generating ids");

    if batch {
        // A batch holds at most `step_mask` IDs; larger counts are split.
        let chunk = usize::try_from(generator.layout().step_mask())?.max(1);
        let mut remaining = count;
        while remaining > 0 {
            let len = remaining.min(chunk);
            for id in generator.generate_batch(len)? {
                writeln!(out, "{}", id.encode(encoding))?;
            }
            remaining -= len;
        }
    } else {
        for _ in 0..count {
            writeln!(out, "{}", generator.generate().encode(encoding))?;
        }
    }

    Ok(())
}

fn decode(
    layout: &Layout,
    value: &str,
    encoding: Encoding,
    json: bool,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let id = Id::decode(encoding, value)
        .with_context(|| format!("failed to decode {value:?} as {encoding}"))?;
    let report = Report::new(id, layout);

    if json {
        serde_json::to_writer(&mut *out, &report)?;
        writeln!(out)?;
    } else {
        write!(out, "{report}")?;
    }
    Ok(())
}

/// Every text form of one ID plus its fields under a layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct Report {
    id: Id,
    decimal: String,
    base2: String,
    base32: String,
    base58: String,
    base64: String,
    bytes: String,
    timestamp: i64,
    time_offset: i64,
    node: i64,
    step: i64,
}

impl Report {
    fn new(id: Id, layout: &Layout) -> Self {
        let components = id.components(layout);
        Self {
            id,
            decimal: id.encode(Encoding::Decimal),
            base2: id.base2(),
            base32: id.base32(),
            base58: id.base58(),
            base64: id.base64(),
            bytes: id.to_bytes().iter().map(|b| format!("{b:02x}")).collect(),
            timestamp: id.timestamp_millis(layout),
            time_offset: components.time_offset,
            node: components.node,
            step: components.step,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "decimal      {}", self.decimal)?;
        writeln!(f, "base2        {}", self.base2)?;
        writeln!(f, "base32       {}", self.base32)?;
        writeln!(f, "base58       {}", self.base58)?;
        writeln!(f, "base64       {}", self.base64)?;
        writeln!(f, "bytes        {}", self.bytes)?;
        writeln!(f, "timestamp    {}", self.timestamp)?;
        writeln!(f, "time_offset  {}", self.time_offset)?;
        writeln!(f, "node         {}", self.node)?;
        writeln!(f, "step         {}", self.step)
    }
}
