#![doc = include_str!("../README.md")]

mod cli;

use clap::Parser;
use cli::config::CliArgs;
use cli::reporter::ConsoleReporter;
use cli::telemetry::init_telemetry;
use fanline::{Canceller, Pipeline, PipelineConfig};
use tokio::signal;

// Using mimalloc for better behavior with many threads, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = PipelineConfig::try_from(&args)?;

    init_telemetry()?;
    tracing::debug!("Pipeline config: {config:#?}");

    let pipeline = Pipeline::new(config)?;
    let running = pipeline.start()?;
    let signals = tokio::spawn(cancel_on_shutdown_signal(running.canceller()));

    // The validator blocks on the merged queue, so it gets a blocking thread.
    let reporter = ConsoleReporter::new(args.json);
    let outcome = tokio::task::spawn_blocking(move || running.finish_with(&reporter)).await;
    signals.abort();

    outcome??;
    tracing::info!("Pipeline finished successfully");
    Ok(())
}

/// Stops the generator early on Ctrl+C or SIGTERM. Values already in flight
/// still drain and are validated.
async fn cancel_on_shutdown_signal(canceller: Canceller) {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }

    tracing::info!("Stopping generator, draining in-flight values...");
    canceller.cancel();
}
