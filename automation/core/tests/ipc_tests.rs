// Copyright (c) 2026 Solon Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Socket-level tests: the listener survives bad requests, replaces stale
//! socket files and refuses to steal a live one.

mod common;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use common::{processor, Recorder};
use solon_core::application::Dispatcher;
use solon_core::domain::rules::DisplayRuleSet;
use solon_core::presentation::{send_command, IpcServer, ListenerConfig, ServerState};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const BEHAVIORS: &str = r#"
behaviors:
  - name: chat
    pattern: open chat
    actions:
      - type: launch_app
        app: Slack
"#;

struct Running {
    shutdown: CancellationToken,
    handle: JoinHandle<std::io::Result<()>>,
    recorder: Arc<Recorder>,
}

fn config(socket_path: &Path) -> ListenerConfig {
    ListenerConfig {
        socket_path: socket_path.to_path_buf(),
        read_timeout: Duration::from_millis(500),
        max_line_bytes: 128,
    }
}

async fn start(socket_path: &Path) -> Running {
    let recorder = Recorder::new();
    let (processor, _) = processor(BEHAVIORS, DisplayRuleSet::default(), &recorder);
    let server = IpcServer::new(config(socket_path), Dispatcher::new(Arc::new(processor)));
    let mut state = server.state();

    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(server.run(shutdown.clone()));
    tokio::time::timeout(
        Duration::from_secs(5),
        state.wait_for(|s| *s != ServerState::Starting),
    )
    .await
    .expect("listener started in time")
    .expect("state channel open");

    Running {
        shutdown,
        handle,
        recorder,
    }
}

async fn raw_request(socket_path: &Path, bytes: &[u8]) -> serde_json::Value {
    let mut stream = UnixStream::connect(socket_path).await.unwrap();
    stream.write_all(bytes).await.unwrap();
    stream.shutdown().await.unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    assert!(response.ends_with('\n'));
    serde_json::from_str(response.trim_end()).unwrap()
}

fn socket_in(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("solon.sock")
}

#[tokio::test]
async fn malformed_requests_do_not_stop_the_listener() {
    let dir = tempfile::tempdir().unwrap();
    let socket = socket_in(&dir);
    let running = start(&socket).await;

    let invalid = raw_request(&socket, b"\xff\xfe open chat\n").await;
    assert_eq!(invalid["success"], false);
    assert!(invalid["message"].as_str().unwrap().starts_with("protocol error:"));
    assert_eq!(invalid["actions"], serde_json::json!([]));

    let overlong = vec![b'a'; 500];
    let mut request = overlong.clone();
    request.push(b'\n');
    let mut stream = UnixStream::connect(&socket).await.unwrap();
    stream.write_all(&request).await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    assert!(response.contains("request exceeds 128 bytes"), "{}", response);

    let result = send_command(&socket, "open chat", Duration::from_secs(5))
        .await
        .unwrap();
    assert!(result.success, "{}", result.message);
    assert_eq!(running.recorder.calls(), vec!["launch Slack []"]);

    running.shutdown.cancel();
    running.handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn shutdown_removes_socket_file() {
    let dir = tempfile::tempdir().unwrap();
    let socket = socket_in(&dir);
    let running = start(&socket).await;
    assert!(socket.exists());

    running.shutdown.cancel();
    running.handle.await.unwrap().unwrap();
    assert!(!socket.exists());
}

#[tokio::test]
async fn stale_socket_file_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let socket = socket_in(&dir);

    // A bound-then-dropped std listener leaves a dead socket file behind.
    drop(std::os::unix::net::UnixListener::bind(&socket).unwrap());
    assert!(socket.exists());

    let running = start(&socket).await;
    let result = send_command(&socket, "open chat", Duration::from_secs(5))
        .await
        .unwrap();
    assert!(result.success);

    running.shutdown.cancel();
    running.handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn live_socket_is_not_stolen() {
    let dir = tempfile::tempdir().unwrap();
    let socket = socket_in(&dir);
    let first = start(&socket).await;

    let recorder = Recorder::new();
    let (processor, _) = processor(BEHAVIORS, DisplayRuleSet::default(), &recorder);
    let second = IpcServer::new(config(&socket), Dispatcher::new(Arc::new(processor)));
    let err = second.run(CancellationToken::new()).await.unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::AddrInUse);

    let result = send_command(&socket, "open chat", Duration::from_secs(5))
        .await
        .unwrap();
    assert!(result.success);

    first.shutdown.cancel();
    first.handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn unknown_command_round_trips_as_no_match() {
    let dir = tempfile::tempdir().unwrap();
    let socket = socket_in(&dir);
    let running = start(&socket).await;

    let result = send_command(&socket, "dance", Duration::from_secs(5))
        .await
        .unwrap();
    assert!(!result.success);
    assert_eq!(result.message, "no matching behavior");
    assert!(result.actions.is_empty());

    running.shutdown.cancel();
    running.handle.await.unwrap().unwrap();
}
