// Copyright (c) 2026 Solon Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Command Processor
//!
//! Turns one line of command text into a [`CommandResult`].
//!
//! Resolution order:
//!
//! 1. blank input is a validation failure
//! 2. built-ins (`reload`, `reapply rules`, `apply startup rules`)
//! 3. special cases (`close port N`, `close APP except REPO`)
//! 4. the behavior registry
//! 5. direct fallbacks (`move APP to DISPLAY`, `open cursor REPO`)
//! 6. `no matching behavior`
//!
//! Actions run strictly in order and best-effort: a failed action is
//! recorded and the next one still runs.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::application::direct_commands::{
    parse_builtin, parse_fallback, parse_special, BuiltinCommand, FallbackCommand,
    SpecialCommand, ValidationError,
};
use crate::application::display_rules::{reapply_actions, startup_actions};
use crate::application::expansion::{expand, resolve_window_filter};
use crate::domain::action::{ActionKind, ConcreteAction, ExpansionError};
use crate::domain::executor::Executors;
use crate::domain::registry::BehaviorRegistry;
use crate::domain::repository::{BehaviorSource, RuleSetSource};
use crate::domain::result::{ActionOutcome, CommandResult};

#[async_trait]
pub trait CommandService: Send + Sync {
    async fn process(&self, input: &str) -> CommandResult;
}

/// Read-mostly handle to the current registry. Reload swaps the whole
/// snapshot; readers keep whichever `Arc` they already cloned.
#[derive(Default)]
pub struct RegistrySnapshot {
    current: RwLock<Arc<BehaviorRegistry>>,
}

impl RegistrySnapshot {
    pub fn new(registry: BehaviorRegistry) -> Self {
        Self {
            current: RwLock::new(Arc::new(registry)),
        }
    }

    pub fn current(&self) -> Arc<BehaviorRegistry> {
        self.current.read().clone()
    }

    pub fn replace(&self, registry: BehaviorRegistry) -> Arc<BehaviorRegistry> {
        std::mem::replace(&mut *self.current.write(), Arc::new(registry))
    }
}

type PlannedAction = (ActionKind, Result<ConcreteAction, ExpansionError>);

pub struct StandardCommandProcessor {
    registry: Arc<RegistrySnapshot>,
    behaviors: Arc<dyn BehaviorSource>,
    rules: Arc<dyn RuleSetSource>,
    executors: Executors,
}

impl StandardCommandProcessor {
    pub fn new(
        registry: Arc<RegistrySnapshot>,
        behaviors: Arc<dyn BehaviorSource>,
        rules: Arc<dyn RuleSetSource>,
        executors: Executors,
    ) -> Self {
        Self {
            registry,
            behaviors,
            rules,
            executors,
        }
    }

    pub fn registry(&self) -> Arc<BehaviorRegistry> {
        self.registry.current()
    }

    async fn run_builtin(&self, command: BuiltinCommand) -> CommandResult {
        match command {
            BuiltinCommand::Reload => self.reload(),
            BuiltinCommand::ReapplyRules { displays } => self.reapply_rules(displays).await,
            BuiltinCommand::ApplyStartupRules => self.apply_startup_rules().await,
        }
    }

    fn reload(&self) -> CommandResult {
        match self.behaviors.load() {
            Ok(registry) => {
                let count = registry.len();
                let previous = self.registry.replace(registry);
                tracing::info!(
                    source = %self.behaviors.describe(),
                    behaviors = count,
                    previous = previous.len(),
                    "behavior registry reloaded"
                );
                CommandResult::ok(format!("reloaded {} behaviors", count))
            }
            Err(e) => {
                let kept = self.registry.current().len();
                tracing::error!(source = %self.behaviors.describe(), error = %e, "reload failed, keeping current registry");
                CommandResult::failure(format!(
                    "reload failed: {}; keeping {} loaded behaviors",
                    e, kept
                ))
            }
        }
    }

    async fn reapply_rules(&self, displays: Option<u32>) -> CommandResult {
        let rules = match self.rules.load() {
            Ok(rules) => rules,
            Err(e) => return CommandResult::failure(format!("failed to load rules: {}", e)),
        };

        let count = match displays {
            Some(count) => count,
            None => match self.executors.displays.display_count().await {
                Ok(count) => count,
                Err(e) => {
                    return CommandResult::failure(format!("failed to count displays: {}", e))
                }
            },
        };

        let plan = reapply_actions(&rules, count)
            .into_iter()
            .map(|action| (action.kind(), Ok(action)))
            .collect();
        self.run_plan(&format!("reapply rules ({} displays)", count), plan)
            .await
    }

    async fn apply_startup_rules(&self) -> CommandResult {
        let rules = match self.rules.load() {
            Ok(rules) => rules,
            Err(e) => return CommandResult::failure(format!("failed to load rules: {}", e)),
        };

        match startup_actions(&rules.startup, self.executors.apps.as_ref()).await {
            Ok(actions) => {
                let plan = actions
                    .into_iter()
                    .map(|action| (action.kind(), Ok(action)))
                    .collect();
                self.run_plan("apply startup rules", plan).await
            }
            Err(e) => CommandResult::failure(format!("failed to list login items: {}", e)),
        }
    }

    async fn run_special(&self, command: SpecialCommand) -> CommandResult {
        let (label, action) = match command {
            SpecialCommand::KillPort { port } => (
                format!("close port {}", port),
                ConcreteAction::KillPort { port, force: false },
            ),
            SpecialCommand::CloseExcept { app, repo } => {
                let keep =
                    resolve_window_filter(&repo, self.executors.repositories.as_ref()).await;
                (
                    format!("close {} except {}", app, repo),
                    ConcreteAction::CloseExcept { app, keep },
                )
            }
        };
        self.run_plan(&label, vec![(action.kind(), Ok(action))]).await
    }

    async fn run_fallback(&self, command: FallbackCommand) -> CommandResult {
        let (label, kind, planned) = match command {
            FallbackCommand::MoveWindow {
                app,
                display,
                maximize,
            } => (
                format!("move {} to {}", app, display),
                ActionKind::MoveWindow,
                Ok(ConcreteAction::MoveWindow {
                    app,
                    display,
                    maximize,
                }),
            ),
            FallbackCommand::OpenRepo { editor, repo } => {
                let planned = self
                    .executors
                    .repositories
                    .locate(&repo)
                    .await
                    .map(|path| ConcreteAction::LaunchApp {
                        app: editor.clone(),
                        args: vec![path.display().to_string()],
                    })
                    .ok_or_else(|| ExpansionError::InvalidField {
                        field: "repo".to_string(),
                        reason: format!("repository '{}' not found", repo),
                    });
                (
                    format!("open {} in {}", repo, editor),
                    ActionKind::LaunchApp,
                    planned,
                )
            }
        };
        self.run_plan(&label, vec![(kind, planned)]).await
    }

    /// Execute planned actions in order, recording every outcome.
    async fn run_plan(&self, label: &str, plan: Vec<PlannedAction>) -> CommandResult {
        let mut outcomes = Vec::with_capacity(plan.len());

        for (index, (kind, planned)) in plan.into_iter().enumerate() {
            let action = match planned {
                Ok(action) => action,
                Err(e) => {
                    tracing::warn!(command = label, index, kind = %kind, error = %e, "action could not be expanded");
                    outcomes.push(ActionOutcome::failed(kind.as_str(), e.to_string()));
                    continue;
                }
            };

            match self.executors.execute(&action).await {
                Ok(()) => {
                    tracing::debug!(command = label, index, kind = %kind, "action succeeded");
                    outcomes.push(ActionOutcome::succeeded(kind.as_str()));
                }
                Err(e) => {
                    tracing::warn!(command = label, index, kind = %kind, error = %e, "action failed");
                    outcomes.push(ActionOutcome::failed(kind.as_str(), e.to_string()));
                }
            }
        }

        CommandResult::from_outcomes(label, outcomes)
    }
}

fn invalid(error: ValidationError) -> CommandResult {
    CommandResult::failure(format!("invalid command: {}", error))
}

#[async_trait]
impl CommandService for StandardCommandProcessor {
    async fn process(&self, input: &str) -> CommandResult {
        let input = input.trim();
        if input.is_empty() {
            return invalid(ValidationError::Empty);
        }

        if let Some(parsed) = parse_builtin(input) {
            return match parsed {
                Ok(command) => self.run_builtin(command).await,
                Err(e) => invalid(e),
            };
        }

        if let Some(parsed) = parse_special(input) {
            return match parsed {
                Ok(command) => self.run_special(command).await,
                Err(e) => invalid(e),
            };
        }

        let registry = self.registry.current();
        if let Some(matched) = registry.match_input(input) {
            let behavior = matched.behavior;
            tracing::debug!(behavior = behavior.name(), params = matched.binding.len(), "behavior matched");
            let mut plan: Vec<PlannedAction> = Vec::with_capacity(behavior.actions().len());
            for template in behavior.actions() {
                let expanded =
                    expand(template, &matched.binding, self.executors.repositories.as_ref()).await;
                plan.push((template.kind(), expanded));
            }
            let label = behavior.name().to_string();
            return self.run_plan(&label, plan).await;
        }

        if let Some(parsed) = parse_fallback(input) {
            return match parsed {
                Ok(command) => self.run_fallback(command).await,
                Err(e) => invalid(e),
            };
        }

        tracing::debug!(input, "no matching behavior");
        CommandResult::no_match()
    }
}
