// Copyright (c) 2026 Solon Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Daemon lifecycle management commands
//!
//! Commands: start, stop, status, install, uninstall

use anyhow::{Context, Result};
use chrono::Local;
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::daemon::{check_daemon_running, stop_daemon, DaemonStatus};
use crate::GlobalOptions;

#[derive(Subcommand)]
pub enum DaemonCommand {
    /// Start the daemon in the background (if not already running)
    Start,

    /// Stop the daemon gracefully
    Stop {
        /// Force kill if daemon doesn't stop gracefully
        #[arg(short, long)]
        force: bool,

        /// Timeout in seconds
        #[arg(short, long, default_value = "10")]
        timeout: u64,
    },

    /// Check daemon status
    Status,

    /// Install the daemon as a per-user service (launchd or systemd)
    Install {
        /// Binary path (default: current executable)
        #[arg(long)]
        binary_path: Option<PathBuf>,
    },

    /// Uninstall the per-user service
    Uninstall,
}

pub async fn handle_command(command: DaemonCommand, options: &GlobalOptions) -> Result<()> {
    match command {
        DaemonCommand::Start => start(options).await,
        DaemonCommand::Stop { force, timeout } => stop(options, force, timeout).await,
        DaemonCommand::Status => status(options).await,
        DaemonCommand::Install { binary_path } => {
            crate::daemon::install::install_service(binary_path).await
        }
        DaemonCommand::Uninstall => crate::daemon::install::uninstall_service().await,
    }
}

async fn start(options: &GlobalOptions) -> Result<()> {
    let config = options.load_config()?;
    config.validate().context("Configuration validation failed")?;
    let socket_path = config.spec.socket_path();

    let behaviors_path = config.spec.behaviors_path();
    if !behaviors_path.exists() {
        println!(
            "{}",
            format!("WARNING: no behaviors file at {}", behaviors_path.display()).yellow()
        );
        println!("         Only built-in commands will be available.");
        println!("         Run 'solon config generate --samples ~/.solon' to create one.");
    }

    info!("Checking if daemon is already running...");

    match check_daemon_running(&socket_path).await {
        Ok(DaemonStatus::Running { pid, .. }) => {
            println!("{}", format!("✓ Daemon already running (PID: {})", display_pid(pid)).green());
            println!("Use 'solon daemon stop' to stop it first.");
            return Ok(());
        }
        Ok(DaemonStatus::Stopped) => {
            info!("Daemon not running, starting...");
        }
        Ok(DaemonStatus::Unhealthy { pid, error }) => {
            warn!("Daemon PID {} exists but unhealthy (error: {}), stopping...", pid, error);
            stop_daemon(&socket_path, false, 10).await?;
        }
        Err(e) => {
            warn!("Failed to check daemon status: {}", e);
        }
    }

    // Re-exec self with --daemon flag
    let current_exe = std::env::current_exe().context("Failed to get current executable path")?;

    let mut cmd = std::process::Command::new(current_exe);
    cmd.arg("--daemon");
    cmd.arg("--socket").arg(&socket_path);
    if let Some(config) = &options.config {
        cmd.arg("--config").arg(config);
    }
    if let Some(level) = &options.log_level {
        cmd.arg("--log-level").arg(level);
    }

    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    let temp_dir = std::env::temp_dir();
    let stdout_path = temp_dir.join("solon.out");
    let stderr_path = temp_dir.join("solon.err");

    let stdout_file =
        std::fs::File::create(&stdout_path).context("Failed to create stdout log file")?;
    let stderr_file =
        std::fs::File::create(&stderr_path).context("Failed to create stderr log file")?;

    cmd.stdin(std::process::Stdio::null())
        .stdout(stdout_file)
        .stderr(stderr_file);

    println!("Redirecting logs to: {}", stdout_path.display());

    let child = cmd.spawn().context("Failed to spawn daemon process")?;

    println!("{}", format!("✓ Daemon starting (PID: {})", child.id()).green());
    println!("Check status with: solon daemon status");

    Ok(())
}

async fn stop(options: &GlobalOptions, force: bool, timeout: u64) -> Result<()> {
    info!("Stopping daemon...");
    let socket_path = options.load_config()?.spec.socket_path();

    match check_daemon_running(&socket_path).await {
        Ok(DaemonStatus::Stopped) => {
            println!("{}", "ℹ Daemon not running".yellow());
        }
        Ok(DaemonStatus::Running { pid: None, .. }) => {
            println!(
                "{}",
                "⚠ Daemon is answering but no PID file was found; stop it via its service manager"
                    .yellow()
            );
        }
        Ok(DaemonStatus::Running { pid: Some(pid), .. })
        | Ok(DaemonStatus::Unhealthy { pid, .. }) => {
            println!("Stopping daemon (PID: {})...", pid);
            stop_daemon(&socket_path, force, timeout).await?;
            println!("{}", "✓ Daemon stopped".green());
        }
        Err(e) => {
            println!("{}", format!("✗ Failed to check daemon: {}", e).red());
            return Err(e);
        }
    }

    Ok(())
}

async fn status(options: &GlobalOptions) -> Result<()> {
    let socket_path = options.load_config()?.spec.socket_path();

    match check_daemon_running(&socket_path).await {
        Ok(DaemonStatus::Running { pid, since }) => {
            println!("{}", "✓ Daemon is running".green());
            println!("  PID: {}", display_pid(pid));
            println!("  Socket: {}", socket_path.display());
            if let Some(since) = since {
                let uptime = (Local::now() - since).num_seconds().max(0) as u64;
                println!(
                    "  Started: {} ({} ago)",
                    since.format("%Y-%m-%d %H:%M:%S"),
                    format_duration(uptime)
                );
            }
        }
        Ok(DaemonStatus::Stopped) => {
            println!("{}", "✗ Daemon is not running".red());
        }
        Ok(DaemonStatus::Unhealthy { pid, error }) => {
            println!("{}", format!("⚠ Daemon unhealthy (PID: {})", pid).yellow());
            println!("  Process exists but the socket check failed: {}", error);
            println!("  Check logs at /tmp/solon.out and /tmp/solon.err");
        }
        Err(e) => {
            println!("{}", format!("✗ Failed to check status: {}", e).red());
            return Err(e);
        }
    }

    Ok(())
}

fn display_pid(pid: Option<u32>) -> String {
    pid.map(|pid| pid.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn format_duration(secs: u64) -> String {
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let minutes = (secs % 3600) / 60;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}
