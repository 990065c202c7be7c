// Copyright (c) 2026 Solon Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Domain layer: behaviors, actions, results and the executor seams.

pub mod action;
pub mod daemon_config;
pub mod executor;
pub mod pattern;
pub mod registry;
pub mod repository;
pub mod result;
pub mod rules;
