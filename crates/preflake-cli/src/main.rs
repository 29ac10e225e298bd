#![doc = include_str!("../README.md")]

mod config;
mod output;
mod telemetry;

use std::io::{BufWriter, Write};

use clap::Parser;
use config::{CliArgs, CliConfig, Command};
use preflake::Generator;
use telemetry::init_telemetry;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = CliConfig::try_from(args)?;

    init_telemetry()?;
    if cfg!(debug_assertions) {
        tracing::debug!("Starting with full config: {:#?}", config);
    }

    let epoch_ms = config.epoch.as_millis() as u64;
    let mut out = BufWriter::new(std::io::stdout().lock());

    match &config.command {
        Command::Generate { pre, count } => {
            let generator = Generator::new(config.node_id, config.epoch, config.layout)?;
            output::generate(&generator, *pre, *count, epoch_ms, config.format, &mut out)?;
        }
        Command::Parse { ids } => {
            output::parse(&config.layout, ids.as_slice(), epoch_ms, config.format, &mut out)?;
        }
    }

    out.flush()?;
    Ok(())
}
