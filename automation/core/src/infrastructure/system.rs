// Copyright (c) 2026 Solon Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Command-line backed executors.
//!
//! Each backend shells out to a stock macOS tool (`open`, `osascript`,
//! `lsof`, `kill`). Calls are short and are never cancelled mid-flight.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;

use crate::domain::action::{DisplayId, WindowState};
use crate::domain::executor::{
    AppLauncher, DisplayProbe, ExecutorError, Executors, PortManager, RepositoryLocator,
    WindowManager,
};

/// Run `program` and return its trimmed stdout.
async fn run(program: &str, args: &[&str]) -> Result<String, ExecutorError> {
    tracing::trace!(program, ?args, "running command");

    let output = Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| ExecutorError::Spawn {
            program: program.to_string(),
            error: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(ExecutorError::CommandFailed {
            program: program.to_string(),
            status: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

async fn osascript(script: &str) -> Result<String, ExecutorError> {
    run("osascript", &["-e", script]).await
}

/// Quote text as an AppleScript string literal.
fn quoted(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

/// `open -a` for launching, AppleScript for quitting and introspection.
#[derive(Debug, Default, Clone)]
pub struct MacAppLauncher;

#[async_trait]
impl AppLauncher for MacAppLauncher {
    async fn launch(&self, app: &str, args: &[String]) -> Result<(), ExecutorError> {
        let mut argv = vec!["-a", app];
        argv.extend(args.iter().map(String::as_str));
        run("open", &argv).await.map(|_| ())
    }

    async fn quit(&self, app: &str) -> Result<(), ExecutorError> {
        osascript(&format!("tell application {} to quit", quoted(app)))
            .await
            .map(|_| ())
    }

    async fn is_running(&self, app: &str) -> Result<bool, ExecutorError> {
        let script = format!(
            "tell application \"System Events\" to return (name of processes) contains {}",
            quoted(app)
        );
        Ok(osascript(&script).await?.eq_ignore_ascii_case("true"))
    }

    async fn login_items(&self) -> Result<Vec<String>, ExecutorError> {
        let output =
            osascript("tell application \"System Events\" to get the name of every login item")
                .await?;
        Ok(output
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect())
    }
}

/// AppleScript (with the AppKit bridge for screen geometry) window control.
#[derive(Debug, Default, Clone)]
pub struct MacWindowManager;

#[async_trait]
impl WindowManager for MacWindowManager {
    async fn move_windows(
        &self,
        app: &str,
        display: DisplayId,
        maximize: bool,
    ) -> Result<(), ExecutorError> {
        // NSScreen frames use a bottom-left origin; only x matters for placement.
        let script = format!(
            r#"use framework "AppKit"
use scripting additions
set screenList to current application's NSScreen's screens()
set screenIndex to {index}
if screenIndex ≥ (count of screenList) then error "display " & screenIndex & " is not connected"
set screenFrame to (item (screenIndex + 1) of screenList)'s frame()
set originX to (item 1 of item 1 of screenFrame) as integer
set screenWidth to (item 1 of item 2 of screenFrame) as integer
set screenHeight to (item 2 of item 2 of screenFrame) as integer
tell application "System Events"
    tell process {app}
        if (count of windows) is 0 then error "no windows for " & {app}
        repeat with w in windows
            set position of w to {{originX + 40, 60}}
            if {maximize} then
                set position of w to {{originX, 25}}
                set size of w to {{screenWidth, screenHeight - 25}}
            end if
        end repeat
    end tell
end tell"#,
            index = display.index(),
            app = quoted(app),
            maximize = maximize,
        );
        osascript(&script).await.map(|_| ())
    }

    async fn set_window_state(&self, app: &str, state: WindowState) -> Result<(), ExecutorError> {
        let statement = match state {
            WindowState::Keep => return Ok(()),
            WindowState::Minimize => "set value of attribute \"AXMinimized\" of w to true",
            WindowState::Maximize => "set value of attribute \"AXFullScreen\" of w to true",
        };
        let script = format!(
            "tell application \"System Events\"\n tell process {}\n  repeat with w in windows\n   try\n    {}\n   end try\n  end repeat\n end tell\nend tell",
            quoted(app),
            statement
        );
        osascript(&script).await.map(|_| ())
    }

    async fn close_windows_except(&self, app: &str, keep: &str) -> Result<usize, ExecutorError> {
        // Window titles show the folder name, not the full path.
        let needle = PathBuf::from(keep)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(keep)
            .to_string();
        let script = format!(
            r#"set closedCount to 0
tell application "System Events"
    tell process {app}
        repeat with w in (windows as list)
            if name of w does not contain {needle} then
                try
                    click (first button of w whose subrole is "AXCloseButton")
                    set closedCount to closedCount + 1
                end try
            end if
        end repeat
    end tell
end tell
return closedCount"#,
            app = quoted(app),
            needle = quoted(&needle),
        );
        let output = osascript(&script).await?;
        output.parse().map_err(|_| ExecutorError::BadOutput {
            program: "osascript".to_string(),
            output,
        })
    }
}

/// `lsof` to find listeners, `kill` to signal them.
#[derive(Debug, Default, Clone)]
pub struct LsofPortManager;

impl LsofPortManager {
    async fn pids_on(&self, port: u16) -> Result<Vec<u32>, ExecutorError> {
        let target = format!(":{}", port);
        match run("lsof", &["-ti", &target]).await {
            Ok(output) => Ok(output
                .lines()
                .filter_map(|line| line.trim().parse().ok())
                .collect()),
            // lsof exits 1 when nothing matches.
            Err(ExecutorError::CommandFailed { status: 1, .. }) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }
}

#[async_trait]
impl PortManager for LsofPortManager {
    async fn kill_port(&self, port: u16, force: bool) -> Result<usize, ExecutorError> {
        let pids = self.pids_on(port).await?;
        if pids.is_empty() {
            return Err(ExecutorError::NotFound(format!(
                "no process is listening on port {}",
                port
            )));
        }

        let signal = if force { "-9" } else { "-15" };
        let mut failures = Vec::new();
        for pid in &pids {
            let pid = pid.to_string();
            match run("kill", &[signal, &pid]).await {
                Ok(_) => tracing::info!(port, pid = %pid, signal, "signalled process"),
                Err(e) => failures.push(format!("{}: {}", pid, e)),
            }
        }

        if failures.is_empty() {
            Ok(pids.len())
        } else {
            Err(ExecutorError::Failed(format!(
                "could not signal {} of {} processes on port {} ({})",
                failures.len(),
                pids.len(),
                port,
                failures.join("; ")
            )))
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct MacDisplayProbe;

#[async_trait]
impl DisplayProbe for MacDisplayProbe {
    async fn display_count(&self) -> Result<u32, ExecutorError> {
        let output = osascript(
            "use framework \"AppKit\"\nreturn count of (current application's NSScreen's screens())",
        )
        .await?;
        output.parse().map_err(|_| ExecutorError::BadOutput {
            program: "osascript".to_string(),
            output,
        })
    }
}

/// Executors backed by the local command-line tools.
pub fn system_executors(repositories: Arc<dyn RepositoryLocator>) -> Executors {
    Executors {
        apps: Arc::new(MacAppLauncher),
        windows: Arc::new(MacWindowManager),
        ports: Arc::new(LsofPortManager),
        displays: Arc::new(MacDisplayProbe),
        repositories,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applescript_quoting_escapes() {
        assert_eq!(quoted("Cursor"), "\"Cursor\"");
        assert_eq!(quoted(r#"say "hi"\"#), r#""say \"hi\"\\""#);
    }

    #[tokio::test]
    async fn missing_program_is_spawn_error() {
        let err = run("solon-definitely-not-installed", &[]).await.unwrap_err();
        assert!(matches!(err, ExecutorError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_is_command_failed() {
        let err = run("sh", &["-c", "echo nope >&2; exit 3"]).await.unwrap_err();
        assert_eq!(
            err,
            ExecutorError::CommandFailed {
                program: "sh".to_string(),
                status: 3,
                stderr: "nope".to_string()
            }
        );
    }
}
