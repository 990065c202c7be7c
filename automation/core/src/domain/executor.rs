// Copyright (c) 2026 Solon Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Action Executors
//!
//! Capability traits for the OS backends the command core drives. Each
//! [`ConcreteAction`] variant maps to exactly one trait method through
//! [`Executors::execute`]; implementations live in
//! `infrastructure::system`.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::action::{ConcreteAction, DisplayId, WindowState};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutorError {
    #[error("failed to run {program}: {error}")]
    Spawn { program: String, error: String },

    #[error("{program} exited with status {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: i32,
        stderr: String,
    },

    #[error("{0}")]
    NotFound(String),

    #[error("unexpected output from {program}: {output}")]
    BadOutput { program: String, output: String },

    #[error("{0}")]
    Failed(String),
}

#[async_trait]
pub trait AppLauncher: Send + Sync {
    /// Start or focus `app`, passing `args` through.
    async fn launch(&self, app: &str, args: &[String]) -> Result<(), ExecutorError>;
    async fn quit(&self, app: &str) -> Result<(), ExecutorError>;
    async fn is_running(&self, app: &str) -> Result<bool, ExecutorError>;
    /// Apps configured to open at login.
    async fn login_items(&self) -> Result<Vec<String>, ExecutorError>;
}

#[async_trait]
pub trait WindowManager: Send + Sync {
    async fn move_windows(
        &self,
        app: &str,
        display: DisplayId,
        maximize: bool,
    ) -> Result<(), ExecutorError>;

    async fn set_window_state(&self, app: &str, state: WindowState) -> Result<(), ExecutorError>;

    /// Close every window of `app` whose title does not contain `keep`.
    async fn close_windows_except(&self, app: &str, keep: &str) -> Result<usize, ExecutorError>;
}

#[async_trait]
pub trait PortManager: Send + Sync {
    /// Terminate processes listening on `port`, returning how many were signalled.
    async fn kill_port(&self, port: u16, force: bool) -> Result<usize, ExecutorError>;
}

#[async_trait]
pub trait DisplayProbe: Send + Sync {
    async fn display_count(&self) -> Result<u32, ExecutorError>;
}

/// Resolves repository names to directories.
#[async_trait]
pub trait RepositoryLocator: Send + Sync {
    async fn locate(&self, name: &str) -> Option<PathBuf>;
}

/// Fixed lookup table from action kind to backend.
#[derive(Clone)]
pub struct Executors {
    pub apps: Arc<dyn AppLauncher>,
    pub windows: Arc<dyn WindowManager>,
    pub ports: Arc<dyn PortManager>,
    pub displays: Arc<dyn DisplayProbe>,
    pub repositories: Arc<dyn RepositoryLocator>,
}

impl Executors {
    pub async fn execute(&self, action: &ConcreteAction) -> Result<(), ExecutorError> {
        match action {
            ConcreteAction::LaunchApp { app, args } => self.apps.launch(app, args).await,
            ConcreteAction::QuitApp { app } => self.apps.quit(app).await,
            ConcreteAction::MoveWindow {
                app,
                display,
                maximize,
            } => self.windows.move_windows(app, *display, *maximize).await,
            ConcreteAction::SetWindowState { app, state } => {
                self.windows.set_window_state(app, *state).await
            }
            ConcreteAction::KillPort { port, force } => {
                self.ports.kill_port(*port, *force).await.map(|_| ())
            }
            ConcreteAction::CloseExcept { app, keep } => {
                self.windows.close_windows_except(app, keep).await.map(|_| ())
            }
        }
    }
}
