// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Storeline daemon (sld)
//!
//! Background process that owns the sweep schedule: hourly deadline
//! reminders and the periodic delay sweep with escalation.

use std::path::PathBuf;

use sl_daemon::lifecycle::{self, Config, LifecycleError};
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse arguments
    let args: Vec<String> = std::env::args().collect();
    let state_dir = if args.len() > 1 {
        PathBuf::from(&args[1])
    } else {
        std::env::current_dir()?.join(".storeline")
    };

    // Load configuration
    let config = Config::load(&state_dir)?;

    // Set up logging
    let _log_guard = setup_logging(&config)?;

    info!("Starting sld with state dir: {}", state_dir.display());

    // Start daemon
    let daemon = match lifecycle::startup(&config) {
        Ok(d) => d,
        Err(e) => {
            error!("Failed to start daemon: {}", e);
            return Err(e.into());
        }
    };

    // Set up signal handlers
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!("Daemon ready");

    // Signal ready for parent process (e.g., systemd, CLI waiting for startup)
    println!("READY");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = std::sync::Arc::clone(&daemon.sweeper);
    let sweeper_task = tokio::spawn(async move { sweeper.run(shutdown_rx).await });

    tokio::select! {
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down...");
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down...");
        }
    }

    let _ = shutdown_tx.send(true);
    if let Err(e) = sweeper_task.await {
        error!("Sweeper task failed: {}", e);
    }
    daemon.shutdown();

    info!("Daemon stopped");
    Ok(())
}

fn setup_logging(
    config: &Config,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Create log directory if needed
    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = tracing_appender::rolling::never(
        config.log_path.parent().unwrap_or(&config.state_dir),
        config
            .log_path
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("sld.log")),
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(guard)
}
