use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use dogshare_cli::telemetry::{self, LogTarget};
use dogshare_cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_dir = telemetry::log_dir()?;
    let target = telemetry::init(telemetry::is_development(), &log_dir)?;

    let shutdown = CancellationToken::new();

    let cleanup = match target {
        LogTarget::File(_) => Some(telemetry::spawn_log_cleanup(
            log_dir,
            telemetry::LOG_RETENTION,
            shutdown.child_token(),
        )),
        LogTarget::Console => None,
    };

    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("received Ctrl+C, cancelling");
                signal_shutdown.cancel();
            }
            Err(e) => error!("failed to listen for Ctrl+C: {}", e),
        }
    });

    info!(version = env!("CARGO_PKG_VERSION"), "dogshare starting");
    let result = dogshare_cli::run(cli, shutdown.clone()).await;
    if let Err(e) = &result {
        error!("command failed: {e:#}");
    }

    if let Some(cleanup) = cleanup {
        telemetry::join_log_cleanup(cleanup).await;
    }

    result
}
