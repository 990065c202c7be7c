// Copyright (c) 2026 Solon Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Per-user service installation (systemd user unit / launchd agent)

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::info;

const SERVICE_TEMPLATE: &str = include_str!("../../templates/solon.service");
const PLIST_TEMPLATE: &str = include_str!("../../templates/dev.solon.daemon.plist");

const LAUNCHD_LABEL: &str = "dev.solon.daemon";

pub async fn install_service(binary_path: Option<PathBuf>) -> Result<()> {
    let binary = match binary_path {
        Some(path) => path,
        None => std::env::current_exe().context("Failed to get current executable path")?,
    };
    if !binary.exists() {
        anyhow::bail!("Binary not found: {:?}", binary);
    }

    if cfg!(target_os = "macos") {
        install_launchd(&binary)
    } else if cfg!(target_os = "linux") {
        install_systemd(&binary)
    } else {
        anyhow::bail!("Service installation only supported on Linux and macOS")
    }
}

pub async fn uninstall_service() -> Result<()> {
    if cfg!(target_os = "macos") {
        uninstall_launchd()
    } else if cfg!(target_os = "linux") {
        uninstall_systemd()
    } else {
        anyhow::bail!("Service uninstallation only supported on Linux and macOS")
    }
}

fn home() -> Result<PathBuf> {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .context("HOME is not set")
}

fn systemd_unit_path() -> Result<PathBuf> {
    Ok(home()?.join(".config/systemd/user/solon.service"))
}

fn launchd_plist_path() -> Result<PathBuf> {
    Ok(home()?.join(format!("Library/LaunchAgents/{}.plist", LAUNCHD_LABEL)))
}

pub fn render_systemd_unit(binary: &Path) -> String {
    SERVICE_TEMPLATE.replace("{{BINARY_PATH}}", &binary.display().to_string())
}

pub fn render_launchd_plist(binary: &Path, log_dir: &Path) -> String {
    PLIST_TEMPLATE
        .replace("{{BINARY_PATH}}", &binary.display().to_string())
        .replace("{{LOG_DIR}}", &log_dir.display().to_string())
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }
    std::fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))
}

fn run(program: &str, args: &[&str]) -> Result<()> {
    let output = std::process::Command::new(program)
        .args(args)
        .output()
        .with_context(|| format!("Failed to run {}", program))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("{} {} failed: {}", program, args.join(" "), stderr.trim());
    }
    Ok(())
}

fn install_systemd(binary: &Path) -> Result<()> {
    info!("Installing systemd user service");

    let unit_path = systemd_unit_path()?;
    write_file(&unit_path, &render_systemd_unit(binary))?;
    println!("{}", format!("✓ Service file created: {}", unit_path.display()).green());

    run("systemctl", &["--user", "daemon-reload"])?;
    println!("{}", "✓ Systemd reloaded".green());

    println!();
    println!("{}", "Service installed successfully!".bold().green());
    println!();
    println!("To enable and start now:");
    println!("  systemctl --user enable --now solon");
    println!();
    println!("To check status:");
    println!("  systemctl --user status solon");

    Ok(())
}

fn uninstall_systemd() -> Result<()> {
    info!("Uninstalling systemd user service");

    let _ = run("systemctl", &["--user", "disable", "--now", "solon"]);

    let unit_path = systemd_unit_path()?;
    if unit_path.exists() {
        std::fs::remove_file(&unit_path)
            .with_context(|| format!("Failed to remove service file: {:?}", unit_path))?;
        println!("{}", format!("✓ Service file removed: {}", unit_path.display()).green());
    }

    let _ = run("systemctl", &["--user", "daemon-reload"]);
    println!("{}", "✓ Service uninstalled".green());

    Ok(())
}

fn install_launchd(binary: &Path) -> Result<()> {
    info!("Installing LaunchAgent");

    let log_dir = home()?.join(".solon/logs");
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory: {:?}", log_dir))?;

    let plist_path = launchd_plist_path()?;
    write_file(&plist_path, &render_launchd_plist(binary, &log_dir))?;
    println!("{}", format!("✓ LaunchAgent plist created: {}", plist_path.display()).green());

    let plist = plist_path.display().to_string();
    run("launchctl", &["load", "-w", &plist])?;
    println!("{}", "✓ LaunchAgent loaded".green());

    println!();
    println!("{}", "Service installed successfully!".bold().green());
    println!();
    println!("The daemon starts automatically at login.");
    println!("Logs: {}", log_dir.display());
    println!();
    println!("To check status:");
    println!("  launchctl list | grep {}", LAUNCHD_LABEL);

    Ok(())
}

fn uninstall_launchd() -> Result<()> {
    info!("Uninstalling LaunchAgent");

    let plist_path = launchd_plist_path()?;
    let plist = plist_path.display().to_string();
    let _ = run("launchctl", &["unload", "-w", &plist]);

    if plist_path.exists() {
        std::fs::remove_file(&plist_path)
            .with_context(|| format!("Failed to remove plist file: {:?}", plist_path))?;
        println!("{}", format!("✓ LaunchAgent plist removed: {}", plist_path.display()).green());
    }

    println!("{}", "✓ Service uninstalled".green());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_are_fully_rendered() {
        let unit = render_systemd_unit(Path::new("/usr/local/bin/solon"));
        assert!(unit.contains("ExecStart=/usr/local/bin/solon --daemon"));
        assert!(!unit.contains("{{"));

        let plist = render_launchd_plist(
            Path::new("/usr/local/bin/solon"),
            Path::new("/Users/me/.solon/logs"),
        );
        assert!(plist.contains("<string>/usr/local/bin/solon</string>"));
        assert!(plist.contains("/Users/me/.solon/logs/solon.err"));
        assert!(!plist.contains("{{"));
    }
}
