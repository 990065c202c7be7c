// Copyright (c) 2026 Solon Contributors
// SPDX-License-Identifier: AGPL-3.0

pub mod behavior_parser;
pub mod display_monitor;
pub mod repo_locator;
pub mod rules_store;
pub mod system;

pub use behavior_parser::BehaviorParser;
pub use display_monitor::DisplayMonitor;
pub use repo_locator::DirectoryRepositoryLocator;
pub use rules_store::{FileBehaviorSource, JsonRuleStore};
pub use system::system_executors;
