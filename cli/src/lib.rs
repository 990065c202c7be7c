// Copyright (c) 2026 Solon Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Solon CLI library: daemon lifecycle, socket client and subcommands.

use std::path::PathBuf;

use anyhow::{Context, Result};
use solon_core::domain::daemon_config::DaemonConfigManifest;

pub mod commands;
pub mod daemon;

/// Flags shared by every subcommand.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub socket: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl GlobalOptions {
    /// Discover and load the daemon config, then apply `--socket`.
    pub fn load_config(&self) -> Result<DaemonConfigManifest> {
        let mut config = DaemonConfigManifest::load_or_default(self.config.clone())
            .context("Failed to load configuration")?;
        if let Some(socket) = &self.socket {
            config.spec.socket_path = socket.display().to_string();
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn socket_flag_overrides_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "apiVersion: solon.dev/v1\nkind: DaemonConfig\nmetadata:\n  name: test\nspec:\n  socket_path: /tmp/from-file.sock\n",
        )
        .unwrap();

        let options = GlobalOptions {
            config: Some(path.clone()),
            ..Default::default()
        };
        let from_file = options.load_config().unwrap();
        if std::env::var_os("SOLON_SOCKET_PATH").is_none() {
            assert_eq!(from_file.spec.socket_path, "/tmp/from-file.sock");
        }

        let options = GlobalOptions {
            config: Some(path),
            socket: Some(PathBuf::from("/tmp/flag.sock")),
            ..Default::default()
        };
        assert_eq!(options.load_config().unwrap().spec.socket_path, "/tmp/flag.sock");
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let options = GlobalOptions {
            config: Some(PathBuf::from("/definitely/not/here.yaml")),
            ..Default::default()
        };
        assert!(options.load_config().is_err());
    }
}
