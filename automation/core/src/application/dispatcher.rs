// Copyright (c) 2026 Solon Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Serialized dispatch path shared by every command source (IPC clients, the
//! display monitor, signal handlers). At most one command executes at a time.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::Instrument;
use uuid::Uuid;

use crate::application::command_processor::CommandService;
use crate::domain::result::CommandResult;

/// Where a command came from, for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOrigin {
    Ipc,
    DisplayMonitor,
    Signal,
    Startup,
}

impl CommandOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandOrigin::Ipc => "ipc",
            CommandOrigin::DisplayMonitor => "display_monitor",
            CommandOrigin::Signal => "signal",
            CommandOrigin::Startup => "startup",
        }
    }
}

#[derive(Clone)]
pub struct Dispatcher {
    service: Arc<dyn CommandService>,
    gate: Arc<Mutex<()>>,
}

impl Dispatcher {
    pub fn new(service: Arc<dyn CommandService>) -> Self {
        Self {
            service,
            gate: Arc::new(Mutex::new(())),
        }
    }

    pub async fn dispatch(&self, input: &str, origin: CommandOrigin) -> CommandResult {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("command", %request_id, origin = origin.as_str());

        async {
            let _turn = self.gate.lock().await;
            tracing::info!(command = input, "dispatching command");

            let result = self.service.process(input).await;

            if result.success {
                tracing::info!(message = %result.message, "command succeeded");
            } else {
                tracing::warn!(message = %result.message, "command failed");
            }
            result
        }
        .instrument(span)
        .await
    }
}
