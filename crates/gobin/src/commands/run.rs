//! The default (and only) command: ensure a tool is built and cached

use std::time::Duration;

use anyhow::{Context, Result};
use gobin_build::Runner;
use gobin_core::GobinConfig;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::cli::Cli;

/// How long in-flight blocking work (a pending lock wait) may delay exit
const SHUTDOWN_GRACE: Duration = Duration::from_millis(200);

pub fn execute(cli: &Cli) -> Result<()> {
    if cli.run {
        tracing::warn!("--run is not supported; the binary is built but not executed");
    }

    // Malformed references are rejected before anything is read from disk
    gobin_build::parse_reference(&cli.reference)?;

    let config = GobinConfig::load(cli.cache_dir.clone())?;
    tracing::debug!(cache_root = %config.cache_root.display(), "loaded configuration");

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    let result = rt.block_on(async {
        let cancel = CancellationToken::new();
        let signals = spawn_signal_handler(cancel.clone());

        let outcome = match Runner::from_config(config) {
            Ok(runner) => {
                runner
                    .run(
                        &cancel,
                        &cli.reference,
                        &cli.build_dir,
                        &cli.build_path,
                        cli.print_path,
                    )
                    .await
            }
            Err(e) => Err(e),
        };

        signals.abort();
        outcome
    });

    rt.shutdown_timeout(SHUTDOWN_GRACE);
    Ok(result?)
}

/// Cancels `cancel` on SIGINT, SIGTERM or SIGHUP
fn spawn_signal_handler(cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        match wait_for_signal().await {
            Ok(()) => {
                tracing::debug!("received shutdown signal");
                cancel.cancel();
            }
            Err(e) => tracing::warn!("Failed to install signal handlers: {e}"),
        }
    })
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate())?;
    let mut hangup = signal(SignalKind::hangup())?;

    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = terminate.recv() => Ok(()),
        _ = hangup.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
