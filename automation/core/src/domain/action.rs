// Copyright (c) 2026 Solon Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Actions
//!
//! Two representations of the same OS-level effect:
//!
//! | Type | Lifetime | Contents |
//! |------|----------|----------|
//! | [`ActionTemplate`] | owned by a behavior, loaded once | field values that may reference `{param}`s |
//! | [`ConcreteAction`] | one command invocation | fully resolved, typed fields |
//!
//! Every template is checked against its kind's field schema when it is
//! built, so expansion only has to deal with values produced by parameter
//! substitution.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::pattern::ParameterBinding;

/// Closed set of action kinds understood by the executors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    LaunchApp,
    QuitApp,
    MoveWindow,
    SetWindowState,
    KillPort,
    CloseExcept,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::LaunchApp => "launch_app",
            ActionKind::QuitApp => "quit_app",
            ActionKind::MoveWindow => "move_window",
            ActionKind::SetWindowState => "set_window_state",
            ActionKind::KillPort => "kill_port",
            ActionKind::CloseExcept => "close_except",
        }
    }

    /// Field schema: `(name, shape, required)`.
    fn schema(&self) -> &'static [(&'static str, FieldShape, bool)] {
        match self {
            ActionKind::LaunchApp => &[
                ("app", FieldShape::Text, true),
                ("args", FieldShape::List, false),
                ("repo", FieldShape::Text, false),
            ],
            ActionKind::QuitApp => &[("app", FieldShape::Text, true)],
            ActionKind::MoveWindow => &[
                ("app", FieldShape::Text, true),
                ("display", FieldShape::Scalar, true),
                ("maximize", FieldShape::Bool, false),
            ],
            ActionKind::SetWindowState => &[
                ("app", FieldShape::Text, true),
                ("state", FieldShape::Text, true),
            ],
            ActionKind::KillPort => &[
                ("port", FieldShape::Scalar, true),
                ("force", FieldShape::Bool, false),
            ],
            ActionKind::CloseExcept => &[
                ("app", FieldShape::Text, true),
                ("repo", FieldShape::Text, true),
            ],
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "launch_app" => Ok(ActionKind::LaunchApp),
            "quit_app" => Ok(ActionKind::QuitApp),
            "move_window" | "move_windows" => Ok(ActionKind::MoveWindow),
            "set_window_state" | "window_behavior" => Ok(ActionKind::SetWindowState),
            "kill_port" => Ok(ActionKind::KillPort),
            "close_except" | "close_windows_except" => Ok(ActionKind::CloseExcept),
            other => Err(TemplateError::UnknownKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldShape {
    Text,
    List,
    Bool,
    /// Text or integer, e.g. a port or display index.
    Scalar,
}

/// Piece of a [`TextTemplate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextSegment {
    Literal(String),
    Param(String),
}

/// A string with `{param}` references, e.g. `~/Desktop/{repo}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextTemplate {
    segments: Vec<TextSegment>,
}

impl TextTemplate {
    pub fn parse(text: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut rest = text;

        while let Some(open) = rest.find('{') {
            if let Some(stray) = rest[..open].find('}') {
                return Err(TemplateError::MalformedText(format!(
                    "unmatched '}}' at offset {} in '{}'",
                    stray, text
                )));
            }
            if open > 0 {
                segments.push(TextSegment::Literal(rest[..open].to_string()));
            }
            let after = &rest[open + 1..];
            let close = after.find('}').ok_or_else(|| {
                TemplateError::MalformedText(format!("unclosed '{{' in '{}'", text))
            })?;
            let name = after[..close].trim();
            if name.is_empty() || name.contains('{') {
                return Err(TemplateError::MalformedText(format!(
                    "empty or nested parameter reference in '{}'",
                    text
                )));
            }
            segments.push(TextSegment::Param(name.to_string()));
            rest = &after[close + 1..];
        }

        if rest.contains('}') {
            return Err(TemplateError::MalformedText(format!(
                "unmatched '}}' in '{}'",
                text
            )));
        }
        if !rest.is_empty() {
            segments.push(TextSegment::Literal(rest.to_string()));
        }

        Ok(Self { segments })
    }

    pub fn literal(text: impl Into<String>) -> Self {
        Self {
            segments: vec![TextSegment::Literal(text.into())],
        }
    }

    pub fn params(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            TextSegment::Param(name) => Some(name.as_str()),
            TextSegment::Literal(_) => None,
        })
    }

    /// Substitute bound parameters. Unbound references are reported as errors.
    pub fn render(&self, binding: &ParameterBinding) -> Result<String, ExpansionError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                TextSegment::Literal(text) => out.push_str(text),
                TextSegment::Param(name) => {
                    let value = binding
                        .get(name)
                        .ok_or_else(|| ExpansionError::UnboundParameter(name.clone()))?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

/// A template field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(TextTemplate),
    List(Vec<TextTemplate>),
    Bool(bool),
    Integer(i64),
}

impl FieldValue {
    fn fits(&self, shape: FieldShape) -> bool {
        matches!(
            (self, shape),
            (FieldValue::Text(_), FieldShape::Text)
                | (FieldValue::List(_), FieldShape::List)
                | (FieldValue::Bool(_), FieldShape::Bool)
                | (FieldValue::Text(_), FieldShape::Scalar)
                | (FieldValue::Integer(_), FieldShape::Scalar)
        )
    }

    fn params(&self) -> Vec<&str> {
        match self {
            FieldValue::Text(t) => t.params().collect(),
            FieldValue::List(items) => items.iter().flat_map(|t| t.params()).collect(),
            FieldValue::Bool(_) | FieldValue::Integer(_) => Vec::new(),
        }
    }
}

/// An action as declared by a behavior, before parameter substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionTemplate {
    kind: ActionKind,
    fields: BTreeMap<String, FieldValue>,
}

impl ActionTemplate {
    /// Build a template, checking fields against the kind's schema.
    pub fn new(
        kind: ActionKind,
        fields: BTreeMap<String, FieldValue>,
    ) -> Result<Self, TemplateError> {
        let schema = kind.schema();

        for (name, value) in &fields {
            let Some((_, shape, _)) = schema.iter().find(|(field, _, _)| field == name) else {
                return Err(TemplateError::UnknownField {
                    kind,
                    field: name.clone(),
                });
            };
            if !value.fits(*shape) {
                return Err(TemplateError::WrongFieldType {
                    kind,
                    field: name.clone(),
                });
            }
        }

        for (name, _, required) in schema {
            if *required && !fields.contains_key(*name) {
                return Err(TemplateError::MissingField {
                    kind,
                    field: name.to_string(),
                });
            }
        }

        Ok(Self { kind, fields })
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Every `{param}` referenced by any field.
    pub fn referenced_params(&self) -> Vec<&str> {
        self.fields.values().flat_map(FieldValue::params).collect()
    }
}

/// Logical display targets. `laptop` is the built-in panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DisplayId(pub u8);

impl DisplayId {
    pub const LAPTOP: DisplayId = DisplayId(0);
    pub const W1: DisplayId = DisplayId(1);
    pub const W2: DisplayId = DisplayId(2);

    pub fn index(&self) -> u8 {
        self.0
    }
}

impl FromStr for DisplayId {
    type Err = ExpansionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let invalid = || ExpansionError::InvalidField {
            field: "display".to_string(),
            reason: format!("'{}' is not a display (laptop, w1, w2, display N)", s.trim()),
        };

        if normalized == "laptop" {
            return Ok(DisplayId::LAPTOP);
        }
        let digits = normalized
            .strip_prefix("display")
            .or_else(|| normalized.strip_prefix('w'))
            .unwrap_or(&normalized)
            .trim();
        digits.parse::<u8>().map(DisplayId).map_err(|_| invalid())
    }
}

impl fmt::Display for DisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            0 => f.write_str("laptop"),
            n => write!(f, "w{}", n),
        }
    }
}

/// Per-app window state applied by display rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowState {
    Maximize,
    Minimize,
    #[serde(alias = "keep_same")]
    Keep,
}

impl FromStr for WindowState {
    type Err = ExpansionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "maximize" | "maximized" => Ok(WindowState::Maximize),
            "minimize" | "minimized" => Ok(WindowState::Minimize),
            "keep" | "keep_same" => Ok(WindowState::Keep),
            other => Err(ExpansionError::InvalidField {
                field: "state".to_string(),
                reason: format!("'{}' is not one of maximize, minimize, keep", other),
            }),
        }
    }
}

/// Fully resolved action, consumed once by an executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConcreteAction {
    LaunchApp { app: String, args: Vec<String> },
    QuitApp { app: String },
    MoveWindow { app: String, display: DisplayId, maximize: bool },
    SetWindowState { app: String, state: WindowState },
    KillPort { port: u16, force: bool },
    CloseExcept { app: String, keep: String },
}

impl ConcreteAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            ConcreteAction::LaunchApp { .. } => ActionKind::LaunchApp,
            ConcreteAction::QuitApp { .. } => ActionKind::QuitApp,
            ConcreteAction::MoveWindow { .. } => ActionKind::MoveWindow,
            ConcreteAction::SetWindowState { .. } => ActionKind::SetWindowState,
            ConcreteAction::KillPort { .. } => ActionKind::KillPort,
            ConcreteAction::CloseExcept { .. } => ActionKind::CloseExcept,
        }
    }
}

/// Template construction errors (load time).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unknown action type '{0}'")]
    UnknownKind(String),

    #[error("{kind} action is missing required field '{field}'")]
    MissingField { kind: ActionKind, field: String },

    #[error("{kind} action has unknown field '{field}'")]
    UnknownField { kind: ActionKind, field: String },

    #[error("{kind} action field '{field}' has the wrong type")]
    WrongFieldType { kind: ActionKind, field: String },

    #[error("malformed text template: {0}")]
    MalformedText(String),
}

/// Expansion errors (per invocation, isolated to one action).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpansionError {
    #[error("parameter '{0}' is not bound")]
    UnboundParameter(String),

    #[error("invalid {field}: {reason}")]
    InvalidField { field: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(TextTemplate::parse(s).unwrap())
    }

    #[test]
    fn text_template_renders_params() {
        let template = TextTemplate::parse("~/Desktop/{repo}/src").unwrap();
        let mut binding = ParameterBinding::new();
        binding.insert("repo", "lucifer");
        assert_eq!(template.render(&binding).unwrap(), "~/Desktop/lucifer/src");
        assert_eq!(template.params().collect::<Vec<_>>(), vec!["repo"]);
    }

    #[test]
    fn text_template_rejects_unbalanced_braces() {
        assert!(TextTemplate::parse("{repo").is_err());
        assert!(TextTemplate::parse("repo}").is_err());
        assert!(TextTemplate::parse("a {} b").is_err());
    }

    #[test]
    fn render_reports_unbound_parameter() {
        let template = TextTemplate::parse("{port}").unwrap();
        let err = template.render(&ParameterBinding::new()).unwrap_err();
        assert_eq!(err, ExpansionError::UnboundParameter("port".to_string()));
    }

    #[test]
    fn template_schema_is_enforced() {
        let ok = ActionTemplate::new(
            ActionKind::KillPort,
            BTreeMap::from([("port".to_string(), text("{port}"))]),
        )
        .unwrap();
        assert_eq!(ok.referenced_params(), vec!["port"]);

        let missing = ActionTemplate::new(ActionKind::MoveWindow, BTreeMap::new());
        assert!(matches!(missing, Err(TemplateError::MissingField { .. })));

        let unknown = ActionTemplate::new(
            ActionKind::QuitApp,
            BTreeMap::from([
                ("app".to_string(), text("Slack")),
                ("colour".to_string(), text("red")),
            ]),
        );
        assert!(matches!(unknown, Err(TemplateError::UnknownField { .. })));

        let wrong = ActionTemplate::new(
            ActionKind::MoveWindow,
            BTreeMap::from([
                ("app".to_string(), text("Cursor")),
                ("display".to_string(), FieldValue::Integer(1)),
                ("maximize".to_string(), text("yes")),
            ]),
        );
        assert!(matches!(wrong, Err(TemplateError::WrongFieldType { .. })));
    }

    #[test]
    fn display_ids_parse_common_spellings() {
        assert_eq!("laptop".parse::<DisplayId>().unwrap(), DisplayId::LAPTOP);
        assert_eq!("W1".parse::<DisplayId>().unwrap(), DisplayId::W1);
        assert_eq!("display 2".parse::<DisplayId>().unwrap(), DisplayId::W2);
        assert_eq!("2".parse::<DisplayId>().unwrap(), DisplayId::W2);
        assert!("kitchen".parse::<DisplayId>().is_err());
        assert_eq!(DisplayId::W2.to_string(), "w2");
    }

    #[test]
    fn action_kind_accepts_legacy_names() {
        assert_eq!("move_windows".parse::<ActionKind>().unwrap(), ActionKind::MoveWindow);
        assert_eq!(
            "close_windows_except".parse::<ActionKind>().unwrap(),
            ActionKind::CloseExcept
        );
        assert!("teleport".parse::<ActionKind>().is_err());
    }
}
