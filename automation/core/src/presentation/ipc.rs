// Copyright (c) 2026 Solon Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Unix-socket command listener
//!
//! One request per connection: the client writes a single UTF-8 line, the
//! server answers with one JSON [`CommandResult`] followed by a newline and
//! closes the connection. Malformed requests get a `protocol error` result
//! and never stop the listener.

use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, field, info, warn, Instrument, Span};

use crate::application::dispatcher::{CommandOrigin, Dispatcher};
use crate::domain::daemon_config::DaemonConfigSpec;
use crate::domain::result::CommandResult;

/// Why a request could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("no request received within {0:?}")]
    Timeout(Duration),

    #[error("request exceeds {limit} bytes")]
    TooLong { limit: usize },

    #[error("request is not valid UTF-8")]
    InvalidUtf8,

    #[error("empty request")]
    Empty,

    #[error("read failed: {0}")]
    Io(String),
}

impl ProtocolError {
    pub fn to_result(&self) -> CommandResult {
        CommandResult::failure(format!("protocol error: {}", self))
    }
}

/// Listener lifecycle, observable through [`IpcServer::state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Starting,
    Listening,
    Stopped,
}

/// Progress of one connection: `Reading -> Dispatching -> Responding`.
/// Malformed requests skip `Dispatching`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStage {
    Reading,
    Dispatching,
    Responding,
}

impl RequestStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStage::Reading => "reading",
            RequestStage::Dispatching => "dispatching",
            RequestStage::Responding => "responding",
        }
    }
}

/// Record `stage` on the current `ipc_request` span.
fn enter_stage(stage: RequestStage) {
    Span::current().record("stage", stage.as_str());
    debug!(stage = stage.as_str(), "request stage");
}

#[derive(Debug, Clone)]
pub struct ListenerConfig {
    pub socket_path: PathBuf,
    pub read_timeout: Duration,
    pub max_line_bytes: usize,
}

impl ListenerConfig {
    pub fn from_spec(spec: &DaemonConfigSpec) -> Self {
        Self {
            socket_path: spec.socket_path(),
            read_timeout: Duration::from_millis(spec.ipc.read_timeout_ms),
            max_line_bytes: spec.ipc.max_line_bytes,
        }
    }
}

pub struct IpcServer {
    config: ListenerConfig,
    dispatcher: Dispatcher,
    state: watch::Sender<ServerState>,
}

impl IpcServer {
    pub fn new(config: ListenerConfig, dispatcher: Dispatcher) -> Self {
        let (state, _) = watch::channel(ServerState::Starting);
        Self {
            config,
            dispatcher,
            state,
        }
    }

    pub fn state(&self) -> watch::Receiver<ServerState> {
        self.state.subscribe()
    }

    pub fn socket_path(&self) -> &Path {
        &self.config.socket_path
    }

    /// Bind the socket and serve until `shutdown` is cancelled.
    ///
    /// In-flight connections are awaited before the socket file is removed.
    pub async fn run(self, shutdown: CancellationToken) -> io::Result<()> {
        let listener = match bind(&self.config.socket_path) {
            Ok(listener) => listener,
            Err(e) => {
                self.state.send_replace(ServerState::Stopped);
                return Err(e);
            }
        };

        info!(
            socket = %self.config.socket_path.display(),
            read_timeout_ms = self.config.read_timeout.as_millis() as u64,
            max_line_bytes = self.config.max_line_bytes,
            "IPC listener ready"
        );
        self.state.send_replace(ServerState::Listening);

        let tracker = TaskTracker::new();
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Shutdown signal received, closing IPC listener");
                    break;
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, _)) => {
                        let dispatcher = self.dispatcher.clone();
                        let config = self.config.clone();
                        tracker.spawn(async move {
                            handle_connection(stream, &config, &dispatcher).await;
                        });
                    }
                    Err(e) => warn!(error = %e, "accept failed"),
                },
            }
        }

        drop(listener);
        tracker.close();
        tracker.wait().await;

        if let Err(e) = std::fs::remove_file(&self.config.socket_path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(error = %e, "could not remove socket file");
            }
        }
        self.state.send_replace(ServerState::Stopped);
        info!("IPC listener stopped");
        Ok(())
    }
}

/// Bind `path`, replacing a stale socket file but refusing a live one.
fn bind(path: &Path) -> io::Result<UnixListener> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    if std::fs::symlink_metadata(path).is_ok() {
        if std::os::unix::net::UnixStream::connect(path).is_ok() {
            return Err(io::Error::new(
                io::ErrorKind::AddrInUse,
                format!("another daemon is listening on {}", path.display()),
            ));
        }
        warn!(socket = %path.display(), "removing stale socket file");
        std::fs::remove_file(path)?;
    }

    let listener = UnixListener::bind(path)?;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(listener)
}

async fn handle_connection(stream: UnixStream, config: &ListenerConfig, dispatcher: &Dispatcher) {
    let span = tracing::debug_span!("ipc_request", stage = field::Empty);
    serve_request(stream, config, dispatcher).instrument(span).await
}

async fn serve_request(stream: UnixStream, config: &ListenerConfig, dispatcher: &Dispatcher) {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    enter_stage(RequestStage::Reading);
    let result = match read_request(&mut reader, config).await {
        Ok(command) => {
            enter_stage(RequestStage::Dispatching);
            dispatcher.dispatch(&command, CommandOrigin::Ipc).await
        }
        Err(e) => {
            warn!(error = %e, "rejected IPC request");
            e.to_result()
        }
    };

    enter_stage(RequestStage::Responding);

    let mut payload = match serde_json::to_vec(&result) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "could not encode response");
            return;
        }
    };
    payload.push(b'\n');

    if let Err(e) = write_half.write_all(&payload).await {
        debug!(error = %e, "client went away before the response was written");
        return;
    }
    let _ = write_half.shutdown().await;
}

async fn read_request<R>(reader: &mut R, config: &ListenerConfig) -> Result<String, ProtocolError>
where
    R: AsyncBufRead + Unpin,
{
    let limit = config.max_line_bytes;
    let mut line = Vec::new();

    let read = tokio::time::timeout(
        config.read_timeout,
        (&mut *reader).take(limit as u64 + 1).read_until(b'\n', &mut line),
    )
    .await
    .map_err(|_| ProtocolError::Timeout(config.read_timeout))?;
    read.map_err(|e| ProtocolError::Io(e.to_string()))?;

    if line.last() == Some(&b'\n') {
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
    } else if line.len() > limit {
        return Err(ProtocolError::TooLong { limit });
    }

    let text = String::from_utf8(line).map_err(|_| ProtocolError::InvalidUtf8)?;
    let command = text.trim();
    if command.is_empty() {
        return Err(ProtocolError::Empty);
    }
    Ok(command.to_string())
}
