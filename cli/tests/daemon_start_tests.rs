// Copyright (c) 2026 Solon Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Daemon startup against a socket another daemon already owns.

use solon_cli::daemon::{pid_file_path, start_daemon};
use solon_core::domain::daemon_config::DaemonConfigManifest;

#[tokio::test]
async fn second_daemon_leaves_running_daemons_pid_file() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("live.sock");
    let _running = std::os::unix::net::UnixListener::bind(&socket).unwrap();

    let pid_file = pid_file_path(&socket);
    std::fs::write(&pid_file, "4242").unwrap();

    let mut config = DaemonConfigManifest::default();
    config.spec.socket_path = socket.display().to_string();
    config.spec.behaviors_file = dir.path().join("behaviors.yaml").display().to_string();
    config.spec.rules_file = dir.path().join("app_rules.json").display().to_string();
    config.spec.display_monitor.enabled = false;
    config.spec.startup.apply_rules = false;

    let err = start_daemon(config).await.unwrap_err();
    assert!(
        format!("{:#}", err).contains("another daemon is listening"),
        "unexpected error: {:#}",
        err
    );
    assert_eq!(std::fs::read_to_string(&pid_file).unwrap(), "4242");
    assert!(socket.exists());
}
