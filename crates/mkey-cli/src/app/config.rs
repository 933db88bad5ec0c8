use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use mkey::{Config, DEFAULT_EPOCH, DEFAULT_NODE_BITS, DEFAULT_STEP_BITS, Encoding, Layout};

use super::telemetry::LogFormat;

/// Command-line and environment settings for the `mkey` binary.
///
/// The layout options must match whatever produced the IDs being decoded, and
/// every producer sharing an ID space must agree on them. They are global so
/// they can appear before or after the subcommand.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "mkey",
    version,
    about = "Generate and inspect time-sortable 64-bit IDs"
)]
pub struct CliArgs {
    /// Epoch in milliseconds since the Unix epoch.
    ///
    /// Environment variable: `MKEY_EPOCH`
    #[arg(long, env = "MKEY_EPOCH", default_value_t = DEFAULT_EPOCH, global = true)]
    pub epoch: i64,

    /// Width of the node field, at most 16.
    ///
    /// Environment variable: `MKEY_NODE_BITS`
    #[arg(long, env = "MKEY_NODE_BITS", default_value_t = DEFAULT_NODE_BITS, global = true)]
    pub node_bits: u8,

    /// Width of the step field, at most 16. Node and step bits together may
    /// not exceed 22.
    ///
    /// Environment variable: `MKEY_STEP_BITS`
    #[arg(long, env = "MKEY_STEP_BITS", default_value_t = DEFAULT_STEP_BITS, global = true)]
    pub step_bits: u8,

    /// Node number of this producer.
    ///
    /// Environment variable: `MKEY_NODE`
    #[arg(long, env = "MKEY_NODE", default_value_t = 0, global = true)]
    pub node: i64,

    /// Draw the node number at random instead of using `--node`.
    ///
    /// Environment variable: `MKEY_RANDOM_NODE`
    #[arg(long, env = "MKEY_RANDOM_NODE", default_value_t = false, global = true)]
    pub random_node: bool,

    /// Log output format. Logs always go to stderr.
    ///
    /// Environment variable: `MKEY_LOG_FORMAT`
    #[arg(long, env = "MKEY_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print new IDs, one per line.
    Generate {
        /// Number of IDs to print.
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,

        /// Issue the IDs in batches sharing one millisecond.
        #[arg(long)]
        batch: bool,

        /// Text form to print.
        #[arg(short, long, value_enum, default_value_t = Format::Decimal)]
        format: Format,
    },
    /// Parse an ID and print every encoding and component.
    Decode {
        /// The encoded ID. Negative decimal and binary values are accepted.
        #[arg(allow_hyphen_values = true)]
        value: String,

        /// Text form of `VALUE`.
        #[arg(short, long, value_enum, default_value_t = Format::Decimal)]
        format: Format,

        /// Print a single JSON object.
        #[arg(long)]
        json: bool,
    },
    /// Print a random node number valid for the configured node bits.
    RandomNode,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Decimal,
    #[value(name = "base2")]
    Base2,
    #[value(name = "base32")]
    Base32,
    #[value(name = "base58")]
    Base58,
    #[value(name = "base64")]
    Base64,
}

impl From<Format> for Encoding {
    fn from(format: Format) -> Self {
        match format {
            Format::Decimal => Self::Decimal,
            Format::Base2 => Self::Base2,
            Format::Base32 => Self::Base32,
            Format::Base58 => Self::Base58,
            Format::Base64 => Self::Base64,
        }
    }
}

/// Validated settings, ready to build a generator from.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub config: Config,
    pub layout: Layout,
    pub command: Command,
}

impl TryFrom<CliArgs> for CliConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.random_node && args.node != 0 {
            bail!("MKEY_NODE ({}) cannot be combined with MKEY_RANDOM_NODE", args.node);
        }

        let mut config = Config::default()
            .with_epoch(args.epoch)
            .with_node_bits(args.node_bits)
            .with_step_bits(args.step_bits)
            .with_node(args.node);
        if args.random_node {
            config = config
                .with_random_node()
                .context("failed to pick a random node")?;
            tracing::info!(node = config.node, "picked a random node");
        }

        let layout = config.layout().context("invalid generator configuration")?;

        Ok(Self {
            config,
            layout,
            command: args.command,
        })
    }
}
