// Copyright (c) 2026 Solon Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Daemon mode implementation
//!
//! Handles:
//! - PID file management
//! - Socket liveness checks
//! - Stopping a running daemon with signals

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

pub mod client;
pub mod install;
pub mod server;

pub use client::DaemonClient;
pub use server::start_daemon;

#[derive(Debug, Clone)]
pub enum DaemonStatus {
    Running {
        pid: Option<u32>,
        since: Option<DateTime<Local>>,
    },
    Stopped,
    Unhealthy { pid: u32, error: String },
}

/// Check the daemon via its socket (primary) and PID file (secondary).
pub async fn check_daemon_running(socket_path: &Path) -> Result<DaemonStatus> {
    let pid_file = pid_file_path(socket_path);
    let local_pid = read_pid(&pid_file);

    match DaemonClient::new(socket_path).ping().await {
        Ok(()) => {
            let since = std::fs::metadata(&pid_file)
                .and_then(|meta| meta.modified())
                .ok()
                .map(DateTime::<Local>::from);
            Ok(DaemonStatus::Running {
                pid: local_pid,
                since,
            })
        }
        Err(e) => match local_pid {
            Some(pid) if process_exists(pid) => Ok(DaemonStatus::Unhealthy {
                pid,
                error: e.to_string(),
            }),
            Some(_) => {
                // Stale PID file
                let _ = std::fs::remove_file(&pid_file);
                Ok(DaemonStatus::Stopped)
            }
            None => Ok(DaemonStatus::Stopped),
        },
    }
}

/// Stop the daemon with SIGTERM, escalating to SIGKILL when `force` is set.
pub async fn stop_daemon(socket_path: &Path, force: bool, timeout_secs: u64) -> Result<()> {
    let pid_file = pid_file_path(socket_path);

    let pid = std::fs::read_to_string(&pid_file)
        .context("Failed to read PID file")?
        .trim()
        .parse::<u32>()
        .context("Invalid PID")?;

    info!("Sending SIGTERM to process {}", pid);
    send_signal(pid, libc::SIGTERM)?;

    for _ in 0..timeout_secs {
        if !process_exists(pid) {
            info!("Daemon stopped gracefully");
            let _ = std::fs::remove_file(&pid_file);
            return Ok(());
        }
        sleep(Duration::from_secs(1)).await;
    }

    if force {
        warn!("Graceful shutdown timeout, sending SIGKILL");
        send_signal(pid, libc::SIGKILL)?;
        sleep(Duration::from_secs(1)).await;
    } else {
        anyhow::bail!("Daemon did not stop within {}s (use --force)", timeout_secs);
    }

    let _ = std::fs::remove_file(&pid_file);
    Ok(())
}

/// The PID file lives next to the socket it belongs to, e.g.
/// `/tmp/solon.sock` -> `/tmp/solon.pid`.
pub fn pid_file_path(socket_path: &Path) -> PathBuf {
    socket_path.with_extension("pid")
}

fn read_pid(pid_file: &Path) -> Option<u32> {
    std::fs::read_to_string(pid_file)
        .ok()
        .and_then(|content| content.trim().parse::<u32>().ok())
}

fn process_exists(pid: u32) -> bool {
    // SAFETY: signal 0 only checks for existence and permission.
    unsafe { libc::kill(pid as i32, 0) == 0 }
}

fn send_signal(pid: u32, signal: i32) -> Result<()> {
    // SAFETY: plain kill(2) on a PID read from our own PID file.
    if unsafe { libc::kill(pid as i32, signal) } != 0 {
        anyhow::bail!("Failed to send signal {} to process {}", signal, pid);
    }
    Ok(())
}

/// Write PID file
pub fn write_pid_file(pid_file: &Path, pid: u32) -> Result<()> {
    if let Some(parent) = pid_file.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create PID directory: {:?}", parent))?;
    }
    std::fs::write(pid_file, pid.to_string())
        .with_context(|| format!("Failed to write PID file: {:?}", pid_file))?;
    info!("Wrote PID file: {:?}", pid_file);
    Ok(())
}

/// Remove the PID file if it still names `pid`; another daemon's file is left alone.
pub fn remove_pid_file(pid_file: &Path, pid: u32) -> Result<()> {
    if read_pid(pid_file) != Some(pid) {
        return Ok(());
    }
    std::fs::remove_file(pid_file)
        .with_context(|| format!("Failed to remove PID file: {:?}", pid_file))?;
    info!("Removed PID file: {:?}", pid_file);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_process_exists() {
        assert!(process_exists(std::process::id()));
    }

    #[test]
    fn read_pid_ignores_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("solon.pid");
        std::fs::write(&path, "not a pid").unwrap();
        assert_eq!(read_pid(&path), None);

        std::fs::write(&path, "4242\n").unwrap();
        assert_eq!(read_pid(&path), Some(4242));
        assert_eq!(read_pid(&dir.path().join("missing.pid")), None);
    }

    #[test]
    fn pid_file_sits_beside_socket() {
        assert_eq!(
            pid_file_path(Path::new("/tmp/solon.sock")),
            PathBuf::from("/tmp/solon.pid")
        );
        assert_eq!(
            pid_file_path(Path::new("/run/user/1000/work.sock")),
            PathBuf::from("/run/user/1000/work.pid")
        );
    }

    #[test]
    fn remove_leaves_another_daemons_pid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("solon.pid");

        write_pid_file(&path, 4242).unwrap();
        remove_pid_file(&path, 7).unwrap();
        assert_eq!(read_pid(&path), Some(4242));

        remove_pid_file(&path, 4242).unwrap();
        assert!(!path.exists());
        remove_pid_file(&path, 4242).unwrap();
    }

    #[tokio::test]
    async fn missing_socket_without_pid_is_stopped_or_unhealthy() {
        let dir = tempfile::tempdir().unwrap();
        let status = check_daemon_running(&dir.path().join("none.sock"))
            .await
            .unwrap();
        assert!(!matches!(status, DaemonStatus::Running { .. }));
    }
}
