// Copyright (c) 2026 Solon Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Daemon process wiring: configuration, registry, executors, the socket
//! listener, the display monitor and signal handling.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use solon_core::application::{CommandOrigin, Dispatcher, RegistrySnapshot, StandardCommandProcessor};
use solon_core::domain::daemon_config::DaemonConfigManifest;
use solon_core::infrastructure::{
    system_executors, BehaviorParser, DirectoryRepositoryLocator, DisplayMonitor,
    FileBehaviorSource, JsonRuleStore,
};
use solon_core::presentation::{IpcServer, ListenerConfig, ServerState};

use super::{pid_file_path, remove_pid_file, write_pid_file};

pub async fn start_daemon(config: DaemonConfigManifest) -> Result<()> {
    config.validate().context("Configuration validation failed")?;
    let spec = &config.spec;

    let pid = std::process::id();
    info!(pid, "Solon daemon starting");

    let behaviors_path = spec.behaviors_path();
    let registry = BehaviorParser::load_registry(&behaviors_path)
        .with_context(|| format!("Failed to load behaviors from {:?}", behaviors_path))?;
    info!(
        behaviors = registry.len(),
        path = %behaviors_path.display(),
        "Behavior registry loaded"
    );

    let locator = Arc::new(DirectoryRepositoryLocator::new(
        spec.repository_roots(),
        spec.repositories.max_depth,
    ));
    let executors = system_executors(locator);
    let processor = StandardCommandProcessor::new(
        Arc::new(RegistrySnapshot::new(registry)),
        Arc::new(FileBehaviorSource::new(behaviors_path)),
        Arc::new(JsonRuleStore::new(spec.rules_path())),
        executors.clone(),
    );
    let dispatcher = Dispatcher::new(Arc::new(processor));

    let shutdown = CancellationToken::new();

    let server = IpcServer::new(ListenerConfig::from_spec(spec), dispatcher.clone());
    let mut server_state = server.state();
    let mut server_task = tokio::spawn(server.run(shutdown.clone()));

    // Wait until the socket is bound (or binding failed).
    let _ = server_state
        .wait_for(|state| *state != ServerState::Starting)
        .await;
    if *server_state.borrow() == ServerState::Stopped {
        return match (&mut server_task).await {
            Ok(Err(e)) => Err(e).context("Failed to start IPC listener"),
            Ok(Ok(())) => anyhow::bail!("IPC listener stopped during startup"),
            Err(e) => Err(e).context("IPC listener task panicked"),
        };
    }

    // Only the daemon that owns the socket records its PID.
    let pid_file = pid_file_path(&spec.socket_path());
    if let Err(e) = write_pid_file(&pid_file, pid) {
        shutdown.cancel();
        let _ = server_task.await;
        return Err(e);
    }
    let _guard = PidFileGuard { path: pid_file, pid };

    let monitor_task = DisplayMonitor::new(
        executors.displays.clone(),
        dispatcher.clone(),
        &spec.display_monitor,
        shutdown.clone(),
    )
    .start();

    if spec.startup.apply_rules {
        let dispatcher = dispatcher.clone();
        tokio::spawn(async move {
            dispatcher
                .dispatch("apply startup rules", CommandOrigin::Startup)
                .await;
        });
    }

    info!(socket = %spec.socket_path().display(), "Solon daemon ready");

    wait_for_signals(&dispatcher, &shutdown).await?;
    shutdown.cancel();

    match server_task.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(error = %e, "IPC listener failed"),
        Err(e) => error!(error = %e, "IPC listener task panicked"),
    }
    if let Err(e) = monitor_task.await {
        error!(error = %e, "Display monitor task panicked");
    }

    info!("Solon daemon stopped");
    Ok(())
}

/// Serve signals until SIGINT or SIGTERM. SIGHUP reloads behaviors.
async fn wait_for_signals(dispatcher: &Dispatcher, shutdown: &CancellationToken) -> Result<()> {
    let mut terminate =
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;
    let mut hangup = signal(SignalKind::hangup()).context("Failed to install SIGHUP handler")?;

    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.context("Failed to listen for Ctrl+C")?;
                info!("Received Ctrl+C signal");
                return Ok(());
            }
            _ = terminate.recv() => {
                info!("Received SIGTERM signal");
                return Ok(());
            }
            _ = hangup.recv() => {
                info!("Received SIGHUP, reloading behaviors");
                let result = dispatcher.dispatch("reload", CommandOrigin::Signal).await;
                if !result.success {
                    warn!(message = %result.message, "Reload on SIGHUP failed");
                }
            }
            _ = shutdown.cancelled() => {
                return Ok(());
            }
        }
    }
}

struct PidFileGuard {
    path: PathBuf,
    pid: u32,
}

impl Drop for PidFileGuard {
    fn drop(&mut self) {
        if let Err(e) = remove_pid_file(&self.path, self.pid) {
            warn!(error = %e, "Failed to remove PID file");
        }
    }
}
