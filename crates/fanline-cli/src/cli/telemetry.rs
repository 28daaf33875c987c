//! Console logging for the `fanline` binary.
//!
//! The pipeline stages log through `tracing`; this module installs the only
//! subscriber. Verbosity follows `RUST_LOG` and defaults to `info`. Stage
//! threads are named (`fanline-worker-3`, ...) so thread names are shown.
//!
//! ```bash
//! RUST_LOG=fanline=trace cargo run -- --run-duration-ms 50
//! ```

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_telemetry() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_thread_names(true)
                .with_line_number(true)
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
                .with_file(true),
        )
        .try_init()?;

    Ok(())
}
