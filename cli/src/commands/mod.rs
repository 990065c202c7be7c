// Copyright (c) 2026 Solon Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the Solon CLI

pub mod config;
pub mod daemon;
pub mod send;

pub use self::config::ConfigCommand;
pub use self::daemon::DaemonCommand;
