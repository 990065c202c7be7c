// Copyright (c) 2026 Solon Contributors
// SPDX-License-Identifier: AGPL-3.0
//! File-backed configuration sources.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::domain::registry::{BehaviorRegistry, ConfigError};
use crate::domain::repository::{BehaviorSource, RuleSetSource};
use crate::domain::rules::DisplayRuleSet;
use crate::infrastructure::behavior_parser::BehaviorParser;

/// Behaviors YAML file on disk.
pub struct FileBehaviorSource {
    path: PathBuf,
}

impl FileBehaviorSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl BehaviorSource for FileBehaviorSource {
    fn load(&self) -> Result<BehaviorRegistry, ConfigError> {
        BehaviorParser::load_registry(&self.path)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Rules JSON file on disk. A missing file means no rules.
pub struct JsonRuleStore {
    path: PathBuf,
}

impl JsonRuleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RuleSetSource for JsonRuleStore {
    fn load(&self) -> Result<DisplayRuleSet, ConfigError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "rules file not found, using empty rule set");
                return Ok(DisplayRuleSet::default());
            }
            Err(e) => {
                return Err(ConfigError::Io {
                    path: self.path.display().to_string(),
                    error: e.to_string(),
                })
            }
        };

        serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: self.path.display().to_string(),
            error: e.to_string(),
        })
    }
}
