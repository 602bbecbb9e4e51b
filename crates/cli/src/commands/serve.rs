//! `serve` command implementation.

use anyhow::{Context, Result};
use config_loader::Settings;
use dispatcher::AlarmManagerFactory;
use tracing::{error, info, warn};

use crate::cli::ServeArgs;
use crate::error::CliError;
use crate::pipeline::Pipeline;

/// Execute the `serve` command
pub async fn run_serve(
    args: &ServeArgs,
    settings: std::result::Result<Settings, CliError>,
) -> Result<()> {
    let settings = settings.context("Invalid configuration")?;

    info!(
        host = %settings.host,
        port = settings.port,
        managers = settings.mgr_count,
        metrics_port = args.metrics_port,
        "Configuration loaded"
    );

    let metrics_port = (args.metrics_port != 0).then_some(args.metrics_port);
    let pipeline = Pipeline::new(settings).with_metrics_port(metrics_port);
    let stats = pipeline
        .run(&AlarmManagerFactory, shutdown_signal())
        .await
        .context("PokeAlarm stopped with an error")?;

    info!(
        events_received = stats.events_received,
        events_dispatched = stats.events_dispatched,
        unrecognized = stats.unrecognized,
        sink_failures = stats.sink_failures,
        backpressure_warnings = stats.backpressure_warnings,
        duration_secs = stats.duration.as_secs_f64(),
        "PokeAlarm finished"
    );
    stats.print_summary();

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    warn!("Received shutdown signal, stopping webhook server...");
}
