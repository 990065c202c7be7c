// Copyright (c) 2026 Solon Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Action plans derived from the display rule set.

use crate::domain::action::{ConcreteAction, WindowState};
use crate::domain::executor::{AppLauncher, ExecutorError};
use crate::domain::rules::{DisplayRuleSet, StartupRules};

/// Window placement actions for `display_count` connected displays.
///
/// Each rule moves the app's windows; a rule that does not maximize and asks
/// for `minimize` or `maximize` also sets the window state.
pub fn reapply_actions(rules: &DisplayRuleSet, display_count: u32) -> Vec<ConcreteAction> {
    let mut actions = Vec::new();

    for (display, entries) in rules.applicable(display_count) {
        for rule in entries {
            let app = rule.app.trim();
            if app.is_empty() {
                continue;
            }
            actions.push(ConcreteAction::MoveWindow {
                app: app.to_string(),
                display,
                maximize: rule.maximize,
            });
            if !rule.maximize && rule.behavior != WindowState::Keep {
                actions.push(ConcreteAction::SetWindowState {
                    app: app.to_string(),
                    state: rule.behavior,
                });
            }
        }
    }

    actions
}

/// Quit actions for running login items that are not kept open.
pub async fn startup_actions(
    startup: &StartupRules,
    apps: &dyn AppLauncher,
) -> Result<Vec<ConcreteAction>, ExecutorError> {
    if !startup.close_others {
        return Ok(Vec::new());
    }

    let mut actions = Vec::new();
    for app in apps.login_items().await? {
        if startup.keeps(&app) {
            continue;
        }
        match apps.is_running(&app).await {
            Ok(true) => actions.push(ConcreteAction::QuitApp { app }),
            Ok(false) => {}
            Err(e) => tracing::warn!(app = %app, error = %e, "could not check whether login item is running"),
        }
    }
    Ok(actions)
}
