// Copyright (c) 2026 Solon Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Client-side tests against an in-process listener.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use solon_cli::commands::send::{exit_code, EXIT_FAILED, EXIT_OK, EXIT_UNREACHABLE};
use solon_cli::daemon::{check_daemon_running, DaemonClient, DaemonStatus};
use solon_core::application::{CommandService, Dispatcher};
use solon_core::domain::result::CommandResult;
use solon_core::presentation::{IpcServer, ListenerConfig, ServerState};
use tokio_util::sync::CancellationToken;

/// Succeeds for `ping me`, reports no match for anything else.
struct Echo;

#[async_trait]
impl CommandService for Echo {
    async fn process(&self, input: &str) -> CommandResult {
        if input == "ping me" {
            CommandResult::ok("pong")
        } else {
            CommandResult::no_match()
        }
    }
}

#[tokio::test]
async fn client_round_trip_and_exit_codes() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("solon.sock");

    let server = IpcServer::new(
        ListenerConfig {
            socket_path: socket.clone(),
            read_timeout: Duration::from_secs(1),
            max_line_bytes: 1024,
        },
        Dispatcher::new(Arc::new(Echo)),
    );
    let mut state = server.state();
    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(server.run(shutdown.clone()));
    state
        .wait_for(|s| *s == ServerState::Listening)
        .await
        .unwrap();

    let client = DaemonClient::new(&socket);
    client.ping().await.unwrap();

    let ok = client.send("ping me").await;
    assert_eq!(ok.as_ref().unwrap().message, "pong");
    assert_eq!(exit_code(&ok), EXIT_OK);

    let miss = client.send("something else").await;
    assert_eq!(exit_code(&miss), EXIT_FAILED);

    assert!(matches!(
        check_daemon_running(&socket).await.unwrap(),
        DaemonStatus::Running { .. }
    ));

    shutdown.cancel();
    handle.await.unwrap().unwrap();

    let gone = DaemonClient::new(&socket).send("ping me").await;
    assert_eq!(exit_code(&gone), EXIT_UNREACHABLE);
}
