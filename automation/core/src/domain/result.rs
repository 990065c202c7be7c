// Copyright (c) 2026 Solon Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Command results as returned to callers and serialized on the IPC wire.

use serde::{Deserialize, Serialize};

/// Outcome of one action within a command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub kind: String,
    pub success: bool,
    pub error: Option<String>,
}

impl ActionOutcome {
    pub fn succeeded(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            success: true,
            error: None,
        }
    }

    pub fn failed(kind: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Aggregated result of one command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub actions: Vec<ActionOutcome>,
}

impl CommandResult {
    pub const NO_MATCH: &'static str = "no matching behavior";

    pub fn no_match() -> Self {
        Self::failure(Self::NO_MATCH)
    }

    /// A failure with no actions attempted.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            actions: Vec::new(),
        }
    }

    /// A success with no actions attempted, e.g. a reload.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            actions: Vec::new(),
        }
    }

    /// Summarize per-action outcomes under `label`.
    ///
    /// `success` holds iff every outcome succeeded. An empty outcome list is a
    /// success: there was nothing to do.
    pub fn from_outcomes(label: &str, actions: Vec<ActionOutcome>) -> Self {
        let total = actions.len();
        let succeeded = actions.iter().filter(|a| a.success).count();
        let mut message = format!("{}: {}/{} actions succeeded", label, succeeded, total);

        if let Some(first) = actions.iter().find(|a| !a.success) {
            message.push_str(&format!(
                "; first failure: {}: {}",
                first.kind,
                first.error.as_deref().unwrap_or("unknown error")
            ));
        }

        Self {
            success: succeeded == total,
            message,
            actions,
        }
    }

    pub fn failed_actions(&self) -> impl Iterator<Item = &ActionOutcome> {
        self.actions.iter().filter(|a| !a.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_names_first_failure() {
        let result = CommandResult::from_outcomes(
            "dev setup",
            vec![
                ActionOutcome::failed("move_window", "no window for Cursor"),
                ActionOutcome::succeeded("kill_port"),
                ActionOutcome::failed("launch_app", "not installed"),
            ],
        );
        assert!(!result.success);
        assert_eq!(
            result.message,
            "dev setup: 1/3 actions succeeded; first failure: move_window: no window for Cursor"
        );
        assert_eq!(result.failed_actions().count(), 2);
    }

    #[test]
    fn all_succeeded() {
        let result = CommandResult::from_outcomes(
            "open cursor",
            vec![ActionOutcome::succeeded("launch_app"), ActionOutcome::succeeded("move_window")],
        );
        assert!(result.success);
        assert_eq!(result.message, "open cursor: 2/2 actions succeeded");
    }

    #[test]
    fn wire_format_uses_null_for_missing_error() {
        let result = CommandResult::from_outcomes("x", vec![ActionOutcome::succeeded("kill_port")]);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": true,
                "message": "x: 1/1 actions succeeded",
                "actions": [{"kind": "kill_port", "success": true, "error": null}]
            })
        );
    }
}
