// Copyright (c) 2026 Solon Contributors
// SPDX-License-Identifier: AGPL-3.0

pub mod command_processor;
pub mod direct_commands;
pub mod dispatcher;
pub mod display_rules;
pub mod expansion;

pub use command_processor::{CommandService, RegistrySnapshot, StandardCommandProcessor};
pub use dispatcher::{CommandOrigin, Dispatcher};
