// Copyright (c) 2026 Solon Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Presentation layer: the command socket and its client.

pub mod client;
pub mod ipc;

pub use client::{send_command, ClientError};
pub use ipc::{IpcServer, ListenerConfig, ProtocolError, RequestStage, ServerState};
