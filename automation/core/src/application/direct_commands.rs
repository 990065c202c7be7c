// Copyright (c) 2026 Solon Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Commands recognized by direct parsing rather than through the registry.
//!
//! | Group | Forms | Checked |
//! |-------|-------|---------|
//! | [`BuiltinCommand`] | `reload`, `reapply rules [for N displays]`, `apply startup rules` | first |
//! | [`SpecialCommand`] | `close/kill port N`, `close APP except REPO` | before the registry |
//! | [`FallbackCommand`] | `move APP to DISPLAY [maximize]`, `open cursor/vscode/code REPO` | after the registry |

use thiserror::Error;

use crate::application::expansion::parse_port;
use crate::domain::action::DisplayId;

/// A structurally invalid command argument. Reported, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("empty command")]
    Empty,

    #[error("{0}")]
    InvalidPort(String),

    #[error("'{command}' needs {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("unknown display '{0}' (expected laptop, w1, w2 or display N)")]
    InvalidDisplay(String),

    #[error("display count must be a positive number, got '{0}'")]
    InvalidDisplayCount(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuiltinCommand {
    Reload,
    /// `None` asks the display probe.
    ReapplyRules { displays: Option<u32> },
    ApplyStartupRules,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    KillPort { port: u16 },
    CloseExcept { app: String, repo: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackCommand {
    MoveWindow {
        app: String,
        display: DisplayId,
        maximize: bool,
    },
    OpenRepo { editor: String, repo: String },
}

/// Whitespace-split input with a lowercased view for keyword checks.
struct Words<'a> {
    original: Vec<&'a str>,
    lowered: Vec<String>,
}

impl<'a> Words<'a> {
    fn new(input: &'a str) -> Self {
        let original: Vec<&str> = input.split_whitespace().collect();
        let lowered = original.iter().map(|w| w.to_lowercase()).collect();
        Self { original, lowered }
    }

    fn is(&self, index: usize, word: &str) -> bool {
        self.lowered.get(index).is_some_and(|w| w == word)
    }

    fn position(&self, word: &str, from: usize) -> Option<usize> {
        self.lowered
            .iter()
            .skip(from)
            .position(|w| w == word)
            .map(|offset| offset + from)
    }

    fn rposition(&self, word: &str) -> Option<usize> {
        self.lowered.iter().rposition(|w| w == word)
    }

    fn join(&self, start: usize, end: usize) -> String {
        self.original[start.min(end)..end].join(" ")
    }

    fn len(&self) -> usize {
        self.original.len()
    }

    fn normalized(&self) -> String {
        self.lowered.join(" ")
    }
}

pub fn parse_builtin(input: &str) -> Option<Result<BuiltinCommand, ValidationError>> {
    let words = Words::new(input);
    match words.normalized().as_str() {
        "reload" | "reload behaviors" => return Some(Ok(BuiltinCommand::Reload)),
        "reapply rules" => return Some(Ok(BuiltinCommand::ReapplyRules { displays: None })),
        "apply startup rules" => return Some(Ok(BuiltinCommand::ApplyStartupRules)),
        _ => {}
    }

    // reapply rules for N display(s)
    if words.len() == 5
        && words.is(0, "reapply")
        && words.is(1, "rules")
        && words.is(2, "for")
        && (words.is(4, "displays") || words.is(4, "display"))
    {
        let count = &words.original[3];
        let parsed = count
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .map(|n| BuiltinCommand::ReapplyRules { displays: Some(n) })
            .ok_or_else(|| ValidationError::InvalidDisplayCount(count.to_string()));
        return Some(parsed);
    }

    None
}

pub fn parse_special(input: &str) -> Option<Result<SpecialCommand, ValidationError>> {
    let words = Words::new(input);

    if (words.is(0, "close") || words.is(0, "kill")) && words.is(1, "port") {
        if words.len() != 3 {
            return Some(Err(ValidationError::MissingArgument {
                command: "close port",
                argument: "exactly one port number",
            }));
        }
        return Some(
            parse_port(words.original[2])
                .map(|port| SpecialCommand::KillPort { port })
                .map_err(ValidationError::InvalidPort),
        );
    }

    if words.is(0, "close") {
        let except = words.position("except", 1)?;
        let app = words.join(1, except);
        let repo = words.join(except + 1, words.len());
        if app.is_empty() || repo.is_empty() {
            return Some(Err(ValidationError::MissingArgument {
                command: "close except",
                argument: "an app before 'except' and a repository after it",
            }));
        }
        return Some(Ok(SpecialCommand::CloseExcept { app, repo }));
    }

    None
}

pub fn parse_fallback(input: &str) -> Option<Result<FallbackCommand, ValidationError>> {
    let words = Words::new(input);

    if words.is(0, "move") {
        let to = words.rposition("to").filter(|to| *to > 1)?;
        let mut end = words.len();
        let maximize = words
            .lowered
            .last()
            .is_some_and(|w| w == "maximize" || w == "maximized");
        if maximize {
            end -= 1;
        }
        let app = words.join(1, to);
        let target = words.join(to + 1, end);
        if target.is_empty() {
            return None;
        }
        return Some(
            target
                .parse::<DisplayId>()
                .map(|display| FallbackCommand::MoveWindow {
                    app,
                    display,
                    maximize,
                })
                .map_err(|_| ValidationError::InvalidDisplay(target)),
        );
    }

    if words.is(0, "open") && words.len() > 2 {
        let editor = match words.lowered[1].as_str() {
            "cursor" => "Cursor",
            "vscode" | "code" => "Visual Studio Code",
            _ => return None,
        };
        return Some(Ok(FallbackCommand::OpenRepo {
            editor: editor.to_string(),
            repo: words.join(2, words.len()),
        }));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins() {
        assert_eq!(parse_builtin(" Reload "), Some(Ok(BuiltinCommand::Reload)));
        assert_eq!(
            parse_builtin("reapply rules"),
            Some(Ok(BuiltinCommand::ReapplyRules { displays: None }))
        );
        assert_eq!(
            parse_builtin("reapply rules for 3 displays"),
            Some(Ok(BuiltinCommand::ReapplyRules { displays: Some(3) }))
        );
        assert!(matches!(
            parse_builtin("reapply rules for zero displays"),
            Some(Err(ValidationError::InvalidDisplayCount(_)))
        ));
        assert_eq!(
            parse_builtin("apply startup rules"),
            Some(Ok(BuiltinCommand::ApplyStartupRules))
        );
        assert_eq!(parse_builtin("reload cursor"), None);
    }

    #[test]
    fn port_commands_validate_range() {
        assert_eq!(
            parse_special("close port 3000"),
            Some(Ok(SpecialCommand::KillPort { port: 3000 }))
        );
        assert_eq!(
            parse_special("KILL PORT 8080"),
            Some(Ok(SpecialCommand::KillPort { port: 8080 }))
        );
        assert!(matches!(
            parse_special("close port 99999"),
            Some(Err(ValidationError::InvalidPort(_)))
        ));
        assert!(matches!(
            parse_special("close port 0"),
            Some(Err(ValidationError::InvalidPort(_)))
        ));
        assert!(matches!(
            parse_special("close port"),
            Some(Err(ValidationError::MissingArgument { .. }))
        ));
    }

    #[test]
    fn close_except_requires_both_sides() {
        assert_eq!(
            parse_special("close Cursor except lucifer"),
            Some(Ok(SpecialCommand::CloseExcept {
                app: "Cursor".to_string(),
                repo: "lucifer".to_string()
            }))
        );
        assert!(matches!(
            parse_special("close except lucifer"),
            Some(Err(ValidationError::MissingArgument { .. }))
        ));
        assert!(matches!(
            parse_special("close cursor except"),
            Some(Err(ValidationError::MissingArgument { .. }))
        ));
        assert_eq!(parse_special("close cursor"), None);
    }

    #[test]
    fn move_fallback() {
        assert_eq!(
            parse_fallback("move Google Chrome to w2 maximize"),
            Some(Ok(FallbackCommand::MoveWindow {
                app: "Google Chrome".to_string(),
                display: DisplayId::W2,
                maximize: true
            }))
        );
        assert_eq!(
            parse_fallback("move slack to display 1"),
            Some(Ok(FallbackCommand::MoveWindow {
                app: "slack".to_string(),
                display: DisplayId::W1,
                maximize: false
            }))
        );
        assert!(matches!(
            parse_fallback("move slack to the moon"),
            Some(Err(ValidationError::InvalidDisplay(_)))
        ));
        assert_eq!(parse_fallback("move to w1"), None);
    }

    #[test]
    fn open_editor_fallback() {
        assert_eq!(
            parse_fallback("open code lucifer"),
            Some(Ok(FallbackCommand::OpenRepo {
                editor: "Visual Studio Code".to_string(),
                repo: "lucifer".to_string()
            }))
        );
        assert_eq!(parse_fallback("open cursor"), None);
        assert_eq!(parse_fallback("open slack now"), None);
    }
}
