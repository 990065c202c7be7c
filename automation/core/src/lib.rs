// Copyright (c) 2026 Solon Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Solon Core
//!
//! Command interpretation and dispatch for the Solon automation daemon.
//!
//! A command is a line of text such as `open cursor lucifer`. It is matched
//! against the behavior registry (or one of the built-in commands), expanded
//! into concrete actions and executed one action at a time through the
//! shared [`application::Dispatcher`].
//!
//! - [`domain`]: patterns, behaviors, actions, results, daemon config
//! - [`application`]: command processing, expansion, dispatch
//! - [`infrastructure`]: file loaders, repository lookup, OS executors, display monitor
//! - [`presentation`]: Unix socket listener and client

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
