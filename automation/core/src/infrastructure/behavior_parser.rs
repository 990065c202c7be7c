// Copyright (c) 2026 Solon Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Behaviors YAML Parser
//!
//! Translates the behaviors file into domain [`BehaviorDefinition`]s.
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Parse external YAML → Domain objects
//! - **Anti-Corruption:** Translates YAML schema to domain model
//!
//! # File Format
//!
//! ```yaml
//! behaviors:
//!   - name: open cursor repo
//!     pattern: open cursor {repo}
//!     actions:
//!       - type: launch_app
//!         app: Cursor
//!         repo: "{repo}"
//!       - type: move_window
//!         app: Cursor
//!         display: w1
//!         maximize: true
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::Deserialize;
use serde_yaml::Value;

use crate::domain::action::{ActionKind, ActionTemplate, FieldValue, TemplateError, TextTemplate};
use crate::domain::registry::{BehaviorDefinition, BehaviorRegistry, ConfigError};

// ============================================================================
// YAML Schema (External Representation)
// ============================================================================

#[derive(Debug, Deserialize)]
struct BehaviorsFileYaml {
    #[serde(default)]
    behaviors: Vec<BehaviorYaml>,
}

#[derive(Debug, Deserialize)]
struct BehaviorYaml {
    name: String,
    pattern: String,
    #[serde(default)]
    actions: Vec<ActionYaml>,
}

#[derive(Debug, Deserialize)]
struct ActionYaml {
    #[serde(rename = "type")]
    kind: String,
    #[serde(flatten)]
    fields: BTreeMap<String, Value>,
}

// ============================================================================
// Parser
// ============================================================================

/// Behaviors file parser (Infrastructure service)
pub struct BehaviorParser;

impl BehaviorParser {
    /// Load a registry from a behaviors file.
    ///
    /// A missing file yields an empty registry; unreadable or invalid content
    /// is a [`ConfigError`].
    pub fn load_registry(path: &Path) -> Result<BehaviorRegistry, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "behaviors file not found, starting with no behaviors");
                return Ok(BehaviorRegistry::empty());
            }
            Err(e) => {
                return Err(ConfigError::Io {
                    path: path.display().to_string(),
                    error: e.to_string(),
                })
            }
        };

        let definitions = Self::parse_yaml(&content).map_err(|e| match e {
            ConfigError::Parse { error, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                error,
            },
            other => other,
        })?;
        BehaviorRegistry::load(definitions)
    }

    /// Parse behavior definitions from YAML text.
    pub fn parse_yaml(yaml: &str) -> Result<Vec<BehaviorDefinition>, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Vec::new());
        }

        let file: BehaviorsFileYaml = serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse {
            path: "behaviors".to_string(),
            error: e.to_string(),
        })?;

        file.behaviors
            .into_iter()
            .map(Self::convert_behavior)
            .collect()
    }

    fn convert_behavior(behavior: BehaviorYaml) -> Result<BehaviorDefinition, ConfigError> {
        let actions = behavior
            .actions
            .into_iter()
            .enumerate()
            .map(|(index, action)| {
                Self::convert_action(action).map_err(|source| ConfigError::InvalidAction {
                    behavior: behavior.name.clone(),
                    index,
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        BehaviorDefinition::new(behavior.name, &behavior.pattern, actions)
    }

    fn convert_action(action: ActionYaml) -> Result<ActionTemplate, TemplateError> {
        let kind: ActionKind = action.kind.parse()?;

        let mut fields = BTreeMap::new();
        for (name, value) in action.fields {
            // Legacy files spell the close-except target `repo_path`.
            let name = match (kind, name.as_str()) {
                (ActionKind::CloseExcept, "repo_path") => "repo".to_string(),
                _ => name,
            };
            if let Some(value) = Self::convert_value(kind, &name, value)? {
                fields.insert(name, value);
            }
        }

        ActionTemplate::new(kind, fields)
    }

    fn convert_value(
        kind: ActionKind,
        field: &str,
        value: Value,
    ) -> Result<Option<FieldValue>, TemplateError> {
        let wrong_type = || TemplateError::WrongFieldType {
            kind,
            field: field.to_string(),
        };

        let converted = match value {
            Value::Null => return Ok(None),
            Value::Bool(flag) => FieldValue::Bool(flag),
            Value::Number(number) => FieldValue::Integer(number.as_i64().ok_or_else(wrong_type)?),
            Value::String(text) => FieldValue::Text(TextTemplate::parse(&text)?),
            Value::Sequence(items) => FieldValue::List(
                items
                    .into_iter()
                    .map(|item| match item {
                        Value::String(text) => TextTemplate::parse(&text),
                        Value::Number(number) => Ok(TextTemplate::literal(number.to_string())),
                        _ => Err(wrong_type()),
                    })
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Value::Mapping(_) | Value::Tagged(_) => return Err(wrong_type()),
        };
        Ok(Some(converted))
    }
}
