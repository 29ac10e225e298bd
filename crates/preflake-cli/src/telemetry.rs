//! Log output for the `preflake` binary.
//!
//! Events go to stderr through `tracing_subscriber::fmt` so stdout carries
//! only identifiers. The level is controlled with `RUST_LOG` and defaults to
//! `info`; the library's own spans and events appear at `debug`/`trace`:
//!
//! ```bash
//! RUST_LOG=preflake=trace preflake generate --pre 1 -n 3
//! ```

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_telemetry() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(false),
        )
        .try_init()?;
    Ok(())
}
