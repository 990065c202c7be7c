// Copyright (c) 2026 Solon Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Client side of the command socket.

use std::io;
use std::path::Path;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

use crate::domain::result::CommandResult;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("daemon is not running (cannot connect to {path}): {source}")]
    Connect {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("connection to daemon failed: {0}")]
    Io(#[from] io::Error),

    #[error("daemon did not answer within {0:?}")]
    Timeout(Duration),

    #[error("daemon closed the connection without a response")]
    NoResponse,

    #[error("malformed response from daemon: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Send one command line and wait for its result.
pub async fn send_command(
    socket_path: &Path,
    command: &str,
    timeout: Duration,
) -> Result<CommandResult, ClientError> {
    let stream = UnixStream::connect(socket_path)
        .await
        .map_err(|source| ClientError::Connect {
            path: socket_path.display().to_string(),
            source,
        })?;

    tokio::time::timeout(timeout, exchange(stream, command))
        .await
        .map_err(|_| ClientError::Timeout(timeout))?
}

async fn exchange(stream: UnixStream, command: &str) -> Result<CommandResult, ClientError> {
    let (read_half, mut write_half) = stream.into_split();

    let mut request = command.replace(['\r', '\n'], " ");
    request.push('\n');
    write_half.write_all(request.as_bytes()).await?;
    write_half.flush().await?;

    let mut line = String::new();
    let read = BufReader::new(read_half).read_line(&mut line).await?;
    if read == 0 {
        return Err(ClientError::NoResponse);
    }
    Ok(serde_json::from_str(line.trim_end())?)
}
