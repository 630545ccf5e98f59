// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, shutdown, locking.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use fs2::FileExt;
use sl_adapters::{ConsoleNotifier, TracedNotifier, WebhookNotifier};
use sl_core::{
    Channel, Contact, DefaultComposer, Delivery, LaunchConfig, Notifier, OverdueRiskScorer,
    SystemClock, UuidIdGen, WorkflowStore,
};
use sl_engine::{EngineDeps, LaunchRules, Sweeper, WorkflowEngine};
use sl_storage::JsonStore;
use thiserror::Error;
use tracing::info;

/// Outbound delivery backend chosen from configuration
pub enum GatewayNotifier {
    Webhook(WebhookNotifier),
    Console(ConsoleNotifier),
}

#[async_trait]
impl Notifier for GatewayNotifier {
    async fn send(
        &self,
        channel: Channel,
        recipient: &Contact,
        message: &str,
        timeout: Duration,
    ) -> Delivery {
        match self {
            GatewayNotifier::Webhook(n) => n.send(channel, recipient, message, timeout).await,
            GatewayNotifier::Console(n) => n.send(channel, recipient, message, timeout).await,
        }
    }
}

/// Daemon engine with concrete adapter types (notifier wrapped with tracing)
pub type DaemonEngine =
    WorkflowEngine<JsonStore, TracedNotifier<GatewayNotifier>, DefaultComposer, SystemClock, UuidIdGen>;

/// Daemon sweeper over the concrete engine
pub type DaemonSweeper = Sweeper<
    JsonStore,
    TracedNotifier<GatewayNotifier>,
    DefaultComposer,
    SystemClock,
    UuidIdGen,
    OverdueRiskScorer,
>;

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// State directory holding config, lock, log, and workflow documents
    pub state_dir: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
    /// Directory of workflow JSON documents
    pub store_path: PathBuf,
    /// Validated launch configuration
    pub launch: LaunchConfig,
}

impl Config {
    /// Load config for a state directory. `launch.toml` inside it is
    /// optional; defaults mirror the reference deployment.
    pub fn load(state_dir: &Path) -> Result<Self, LifecycleError> {
        let launch_path = state_dir.join("launch.toml");
        let launch = if launch_path.exists() {
            LaunchConfig::load(&launch_path)?
        } else {
            LaunchConfig::default()
        };

        Ok(Self {
            state_dir: state_dir.to_path_buf(),
            lock_path: state_dir.join("sld.pid"),
            log_path: state_dir.join("sld.log"),
            store_path: state_dir.join("workflows"),
            launch,
        })
    }
}

/// Daemon state during operation
pub struct DaemonState {
    pub config: Config,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    pub engine: Arc<DaemonEngine>,
    pub sweeper: Arc<DaemonSweeper>,
}

impl DaemonState {
    /// Shutdown the daemon gracefully
    pub fn shutdown(&self) {
        info!("Shutting down daemon...");
        if self.config.lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.lock_path) {
                tracing::warn!("Failed to remove PID file: {}", e);
            }
        }
        // Lock file handle is released when DaemonState drops
        info!("Daemon shutdown complete");
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] sl_core::ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] sl_core::StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Start the daemon
pub fn startup(config: &Config) -> Result<DaemonState, LifecycleError> {
    // 1. Create state directory
    std::fs::create_dir_all(&config.state_dir)?;

    // 2. Acquire lock file FIRST - prevents a second sweeper on this store
    let lock_file = File::create(&config.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;

    // Write PID to lock file
    use std::io::Write;
    let mut lock_file = lock_file;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    // 3. Validate rules before touching the store (fail fast)
    let rules = LaunchRules::from_config(&config.launch)?;

    // 4. Open the store
    let store = JsonStore::open(&config.store_path)?;
    info!(
        workflows = store.list().map(|ids| ids.len()).unwrap_or(0),
        "store opened"
    );

    // 5. Pick the delivery backend
    let gateway = match &config.launch.notify_gateway {
        Some(url) => {
            info!(url = %url, "using webhook notification gateway");
            GatewayNotifier::Webhook(WebhookNotifier::new(url.clone()))
        }
        None => {
            info!("no notification gateway configured, logging sends");
            GatewayNotifier::Console(ConsoleNotifier::new())
        }
    };
    let notifier = TracedNotifier::new(gateway);

    // 6. Build engine and sweeper
    let engine = Arc::new(WorkflowEngine::new(
        EngineDeps {
            store,
            notifier,
            composer: DefaultComposer,
        },
        rules,
        SystemClock,
        UuidIdGen,
    ));
    let sweeper = Arc::new(Sweeper::new(
        Arc::clone(&engine),
        OverdueRiskScorer,
        config.launch.sweep.clone(),
    ));

    info!(state_dir = %config.state_dir.display(), "daemon started");

    Ok(DaemonState {
        config: config.clone(),
        lock_file,
        engine,
        sweeper,
    })
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
