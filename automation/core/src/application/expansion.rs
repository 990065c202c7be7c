// Copyright (c) 2026 Solon Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Template expansion: [`ActionTemplate`] + [`ParameterBinding`] → [`ConcreteAction`].
//!
//! Expansion runs per action. A field that is malformed after substitution
//! (a non-numeric port, an unknown display) fails only that action.

use std::path::Path;

use crate::domain::action::{
    ActionKind, ActionTemplate, ConcreteAction, DisplayId, ExpansionError, FieldValue,
    WindowState,
};
use crate::domain::executor::RepositoryLocator;
use crate::domain::pattern::ParameterBinding;

pub async fn expand(
    template: &ActionTemplate,
    binding: &ParameterBinding,
    repositories: &dyn RepositoryLocator,
) -> Result<ConcreteAction, ExpansionError> {
    let fields = Fields { template, binding };

    let action = match template.kind() {
        ActionKind::LaunchApp => {
            let app = fields.required_text("app")?;
            let mut args = fields.list("args")?;
            if let Some(repo) = fields.optional_text("repo")? {
                let path = repositories.locate(&repo).await.ok_or_else(|| {
                    invalid("repo", format!("repository '{}' not found", repo))
                })?;
                args.push(path.display().to_string());
            }
            ConcreteAction::LaunchApp { app, args }
        }
        ActionKind::QuitApp => ConcreteAction::QuitApp {
            app: fields.required_text("app")?,
        },
        ActionKind::MoveWindow => ConcreteAction::MoveWindow {
            app: fields.required_text("app")?,
            display: fields.display("display")?,
            maximize: fields.flag("maximize")?,
        },
        ActionKind::SetWindowState => ConcreteAction::SetWindowState {
            app: fields.required_text("app")?,
            state: fields.required_text("state")?.parse::<WindowState>()?,
        },
        ActionKind::KillPort => ConcreteAction::KillPort {
            port: fields.port("port")?,
            force: fields.flag("force")?,
        },
        ActionKind::CloseExcept => {
            let repo = fields.required_text("repo")?;
            ConcreteAction::CloseExcept {
                app: fields.required_text("app")?,
                keep: resolve_window_filter(&repo, repositories).await,
            }
        }
    };

    Ok(action)
}

/// Window-title filter for close-except: a path stays a path, a repository
/// name becomes its located path, anything else is used verbatim.
pub async fn resolve_window_filter(repo: &str, repositories: &dyn RepositoryLocator) -> String {
    if repo.contains('/') || repo.starts_with('~') {
        return repo.to_string();
    }
    repositories
        .locate(repo)
        .await
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| repo.to_string())
}

/// Parse a TCP port in `1..=65535`.
pub fn parse_port(text: &str) -> Result<u16, String> {
    let trimmed = text.trim();
    let value: i64 = trimmed
        .parse()
        .map_err(|_| format!("'{}' is not a port number", trimmed))?;
    port_in_range(value)
}

fn port_in_range(value: i64) -> Result<u16, String> {
    u16::try_from(value)
        .ok()
        .filter(|port| *port != 0)
        .ok_or_else(|| format!("port {} is out of range (1-65535)", value))
}

fn invalid(field: &str, reason: impl Into<String>) -> ExpansionError {
    ExpansionError::InvalidField {
        field: field.to_string(),
        reason: reason.into(),
    }
}

struct Fields<'a> {
    template: &'a ActionTemplate,
    binding: &'a ParameterBinding,
}

impl Fields<'_> {
    fn optional_text(&self, name: &str) -> Result<Option<String>, ExpansionError> {
        match self.template.field(name) {
            None => Ok(None),
            Some(FieldValue::Text(text)) => {
                let rendered = text.render(self.binding)?;
                let normalized = rendered.split_whitespace().collect::<Vec<_>>().join(" ");
                if normalized.is_empty() {
                    return Err(invalid(name, "value is empty"));
                }
                Ok(Some(normalized))
            }
            Some(FieldValue::Integer(value)) => Ok(Some(value.to_string())),
            Some(_) => Err(invalid(name, "expected text")),
        }
    }

    fn required_text(&self, name: &str) -> Result<String, ExpansionError> {
        self.optional_text(name)?
            .ok_or_else(|| invalid(name, "field is missing"))
    }

    fn list(&self, name: &str) -> Result<Vec<String>, ExpansionError> {
        match self.template.field(name) {
            None => Ok(Vec::new()),
            Some(FieldValue::List(items)) => items
                .iter()
                .map(|item| item.render(self.binding))
                .collect(),
            Some(_) => Err(invalid(name, "expected a list")),
        }
    }

    fn flag(&self, name: &str) -> Result<bool, ExpansionError> {
        match self.template.field(name) {
            None => Ok(false),
            Some(FieldValue::Bool(flag)) => Ok(*flag),
            Some(_) => Err(invalid(name, "expected true or false")),
        }
    }

    fn display(&self, name: &str) -> Result<DisplayId, ExpansionError> {
        match self.template.field(name) {
            Some(FieldValue::Integer(index)) => u8::try_from(*index)
                .map(DisplayId)
                .map_err(|_| invalid(name, format!("display index {} is out of range", index))),
            _ => self.required_text(name)?.parse::<DisplayId>(),
        }
    }

    fn port(&self, name: &str) -> Result<u16, ExpansionError> {
        match self.template.field(name) {
            Some(FieldValue::Integer(value)) => port_in_range(*value).map_err(|e| invalid(name, e)),
            _ => parse_port(&self.required_text(name)?).map_err(|e| invalid(name, e)),
        }
    }
}
