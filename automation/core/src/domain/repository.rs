// Copyright (c) 2026 Solon Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Configuration Sources
//!
//! Read-only contracts for the on-disk configuration the command core
//! consumes, implemented in `crate::infrastructure`.
//!
//! | Trait | Produces | Implementation |
//! |-------|----------|----------------|
//! | `BehaviorSource` | `BehaviorRegistry` | `FileBehaviorSource` (YAML) |
//! | `RuleSetSource` | `DisplayRuleSet` | `JsonRuleStore` (JSON) |
//!
//! Both are read whole: a behaviors reload builds a fresh registry, and the
//! rule set is re-read on every reapply.

use crate::domain::registry::{BehaviorRegistry, ConfigError};
use crate::domain::rules::DisplayRuleSet;

pub trait BehaviorSource: Send + Sync {
    fn load(&self) -> Result<BehaviorRegistry, ConfigError>;

    /// Human-readable origin for logs, e.g. a file path.
    fn describe(&self) -> String;
}

pub trait RuleSetSource: Send + Sync {
    fn load(&self) -> Result<DisplayRuleSet, ConfigError>;
}
