// Copyright (c) 2026 Solon Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Display Rule Set
//!
//! Per-display app placement rules plus startup rules, read from a JSON rules
//! file:
//!
//! ```json
//! {
//!   "startup": { "keep_open": ["Slack"], "close_others": true },
//!   "display_rules": {
//!     "w1": [{ "app": "Cursor", "behavior": "maximize", "maximize": true }],
//!     "laptop": [{ "app": "Spotify", "behavior": "minimize" }]
//!   }
//! }
//! ```
//!
//! The core only reads this file; it is re-read on every reapply.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::action::{DisplayId, WindowState};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartupRules {
    #[serde(default)]
    pub keep_open: Vec<String>,
    #[serde(default = "default_close_others")]
    pub close_others: bool,
}

fn default_close_others() -> bool {
    true
}

impl Default for StartupRules {
    fn default() -> Self {
        Self {
            keep_open: Vec::new(),
            close_others: default_close_others(),
        }
    }
}

impl StartupRules {
    pub fn keeps(&self, app: &str) -> bool {
        self.keep_open.iter().any(|kept| kept.eq_ignore_ascii_case(app))
    }
}

/// One app placement on a display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayRule {
    pub app: String,
    #[serde(default = "default_behavior")]
    pub behavior: WindowState,
    #[serde(default)]
    pub maximize: bool,
}

fn default_behavior() -> WindowState {
    WindowState::Keep
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayRuleSet {
    #[serde(default)]
    pub startup: StartupRules,
    /// Display name (`laptop`, `w1`, `w2`, ...) to ordered rules.
    #[serde(default)]
    pub display_rules: BTreeMap<String, Vec<DisplayRule>>,
}

impl DisplayRuleSet {
    /// Rules that apply with `display_count` displays connected, ordered by
    /// display index.
    ///
    /// The laptop panel always applies; display `wN` needs at least `N + 1`
    /// displays. Keys that do not name a display are skipped.
    pub fn applicable(&self, display_count: u32) -> Vec<(DisplayId, &[DisplayRule])> {
        let mut applicable: Vec<(DisplayId, &[DisplayRule])> = self
            .display_rules
            .iter()
            .filter_map(|(key, rules)| {
                let display = key.parse::<DisplayId>().ok()?;
                let needed = u32::from(display.index()) + 1;
                (display == DisplayId::LAPTOP || display_count >= needed)
                    .then_some((display, rules.as_slice()))
            })
            .collect();
        applicable.sort_by_key(|(display, _)| *display);
        applicable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DisplayRuleSet {
        serde_json::from_str(
            r#"{
                "startup": {"keep_open": ["Slack", "Cursor"]},
                "display_rules": {
                    "w2": [{"app": "Notes", "behavior": "minimize"}],
                    "w1": [{"app": "Cursor", "behavior": "keep_same", "maximize": true}],
                    "laptop": [{"app": "Spotify"}],
                    "kitchen": [{"app": "Oven"}]
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn parses_rules_file_with_defaults() {
        let rules = sample();
        assert!(rules.startup.close_others);
        assert!(rules.startup.keeps("slack"));
        assert_eq!(rules.display_rules["laptop"][0].behavior, WindowState::Keep);
        assert_eq!(rules.display_rules["w1"][0].behavior, WindowState::Keep);
        assert!(rules.display_rules["w1"][0].maximize);
    }

    #[test]
    fn applicable_rules_follow_display_count() {
        let rules = sample();

        let one: Vec<_> = rules.applicable(1).into_iter().map(|(d, _)| d).collect();
        assert_eq!(one, vec![DisplayId::LAPTOP]);

        let two: Vec<_> = rules.applicable(2).into_iter().map(|(d, _)| d).collect();
        assert_eq!(two, vec![DisplayId::LAPTOP, DisplayId::W1]);

        let three: Vec<_> = rules.applicable(3).into_iter().map(|(d, _)| d).collect();
        assert_eq!(three, vec![DisplayId::LAPTOP, DisplayId::W1, DisplayId::W2]);
    }

    #[test]
    fn empty_file_is_default() {
        let rules: DisplayRuleSet = serde_json::from_str("{}").unwrap();
        assert_eq!(rules, DisplayRuleSet::default());
        assert!(rules.applicable(3).is_empty());
    }
}
