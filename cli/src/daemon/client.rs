// Copyright (c) 2026 Solon Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Socket client for talking to a running daemon

use std::path::{Path, PathBuf};
use std::time::Duration;

use solon_core::domain::result::CommandResult;
use solon_core::presentation::{send_command, ClientError};

/// Commands can run several OS actions; allow them time to finish.
const COMMAND_TIMEOUT: Duration = Duration::from_secs(60);
const PING_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct DaemonClient {
    socket_path: PathBuf,
    timeout: Duration,
}

impl DaemonClient {
    pub fn new(socket_path: impl AsRef<Path>) -> Self {
        Self {
            socket_path: socket_path.as_ref().to_path_buf(),
            timeout: COMMAND_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    pub async fn send(&self, command: &str) -> Result<CommandResult, ClientError> {
        send_command(&self.socket_path, command, self.timeout).await
    }

    /// Liveness check. An empty line is answered with a protocol error
    /// without running anything, so any well-formed reply means the daemon
    /// is serving.
    pub async fn ping(&self) -> Result<(), ClientError> {
        send_command(&self.socket_path, "", PING_TIMEOUT).await.map(|_| ())
    }
}
