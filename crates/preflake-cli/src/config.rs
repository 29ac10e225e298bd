use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use core::time::Duration;
use preflake::{CUSTOM_EPOCH, Layout};

/// Command line arguments for the `preflake` binary.
///
/// Every setting except the subcommand can also come from the environment
/// (or a `.env` file), so a deployment can pin its node id and layout once.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "preflake",
    version,
    about = "Generate and decode time-ordered hex identifiers"
)]
pub struct CliArgs {
    /// Node id stamped into every generated identifier.
    ///
    /// Must fit in the node field (`2^node_bits - 1` at most). Each process
    /// generating identifiers concurrently needs its own node id.
    ///
    /// Environment variable: `PREFLAKE_NODE_ID`
    #[arg(long, env = "PREFLAKE_NODE_ID", default_value_t = 1, global = true)]
    pub node_id: u64,

    /// Epoch, in milliseconds since the UNIX epoch, that the time field
    /// counts from.
    ///
    /// Environment variable: `PREFLAKE_EPOCH_MS`
    #[arg(long, env = "PREFLAKE_EPOCH_MS", default_value_t = CUSTOM_EPOCH.as_millis() as u64, global = true)]
    pub epoch_ms: u64,

    /// Width of the caller-supplied `pre` field in bits.
    ///
    /// Environment variable: `PREFLAKE_PRE_BITS`
    #[arg(long, env = "PREFLAKE_PRE_BITS", default_value_t = Layout::DEFAULT.pre_bits(), global = true)]
    pub pre_bits: u32,

    /// Width of the time field in bits.
    ///
    /// Environment variable: `PREFLAKE_TIME_BITS`
    #[arg(long, env = "PREFLAKE_TIME_BITS", default_value_t = Layout::DEFAULT.time_bits(), global = true)]
    pub time_bits: u32,

    /// Width of the node field in bits.
    ///
    /// Environment variable: `PREFLAKE_NODE_BITS`
    #[arg(long, env = "PREFLAKE_NODE_BITS", default_value_t = Layout::DEFAULT.node_bits(), global = true)]
    pub node_bits: u32,

    /// Width of the step field in bits.
    ///
    /// Environment variable: `PREFLAKE_STEP_BITS`
    #[arg(long, env = "PREFLAKE_STEP_BITS", default_value_t = Layout::DEFAULT.step_bits(), global = true)]
    pub step_bits: u32,

    /// Output format written to stdout.
    ///
    /// Environment variable: `PREFLAKE_FORMAT`
    #[arg(long, env = "PREFLAKE_FORMAT", value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Generate identifiers carrying a `pre` value.
    Generate {
        /// Caller-supplied partition value; must fit in `pre_bits`.
        #[arg(long)]
        pre: u64,

        /// Number of identifiers to generate.
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
    },
    /// Decode identifiers into their fields.
    Parse {
        /// Identifiers in their hex text form (case-insensitive).
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One human-readable line per identifier.
    Text,
    /// One JSON object per line.
    Json,
}

/// Validated configuration built from [`CliArgs`].
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub node_id: u64,
    pub epoch: Duration,
    pub layout: Layout,
    pub format: OutputFormat,
    pub command: Command,
}

impl TryFrom<CliArgs> for CliConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let layout = Layout::new(args.pre_bits, args.time_bits, args.node_bits, args.step_bits)
            .with_context(|| {
                format!(
                    "PREFLAKE_*_BITS ({}/{}/{}/{}) do not form a valid layout",
                    args.pre_bits, args.time_bits, args.node_bits, args.step_bits
                )
            })?;

        if args.node_id > layout.max_node() {
            bail!(
                "PREFLAKE_NODE_ID ({}) exceeds the node field (max = {})",
                args.node_id,
                layout.max_node()
            );
        }

        if let Command::Generate { pre, count } = &args.command {
            if *count == 0 {
                bail!("--count must be greater than 0");
            }
            if *pre > layout.max_pre() {
                bail!(
                    "--pre ({}) exceeds the pre field (max = {})",
                    pre,
                    layout.max_pre()
                );
            }
        }

        Ok(Self {
            node_id: args.node_id,
            epoch: Duration::from_millis(args.epoch_ms),
            layout,
            format: args.format,
            command: args.command,
        })
    }
}
