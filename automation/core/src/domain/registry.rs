// Copyright (c) 2026 Solon Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Behavior Registry
//!
//! Immutable, ordered collection of [`BehaviorDefinition`]s. A registry is
//! built once from a behaviors file and replaced wholesale on reload; it is
//! never mutated in place.
//!
//! ## Selection
//!
//! When several behaviors match the same input, the one whose pattern has the
//! most literal words wins. Equal literal counts prefer the pattern with more
//! capture slots, then the behavior defined first.

use std::collections::HashSet;

use thiserror::Error;

use crate::domain::action::{ActionTemplate, TemplateError};
use crate::domain::pattern::{ParameterBinding, Pattern, PatternError};

/// Errors that make a configuration unusable. Fatal at load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("behavior '{behavior}': invalid pattern: {source}")]
    InvalidPattern {
        behavior: String,
        #[source]
        source: PatternError,
    },

    #[error("behavior '{behavior}', action #{index}: {source}")]
    InvalidAction {
        behavior: String,
        index: usize,
        #[source]
        source: TemplateError,
    },

    #[error("behavior '{behavior}' references parameter '{param}' that its pattern does not capture")]
    UnboundParameter { behavior: String, param: String },

    #[error("duplicate behavior name '{0}'")]
    DuplicateName(String),

    #[error("behavior '{0}' declares no actions")]
    NoActions(String),

    #[error("behavior name must not be empty")]
    EmptyName,

    #[error("failed to read {path}: {error}")]
    Io { path: String, error: String },

    #[error("failed to parse {path}: {error}")]
    Parse { path: String, error: String },
}

/// A named pattern-to-actions mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BehaviorDefinition {
    name: String,
    pattern: Pattern,
    actions: Vec<ActionTemplate>,
}

impl BehaviorDefinition {
    /// Compile and validate a behavior. Every parameter referenced by an
    /// action must be captured by the pattern.
    pub fn new(
        name: impl Into<String>,
        pattern: &str,
        actions: Vec<ActionTemplate>,
    ) -> Result<Self, ConfigError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ConfigError::EmptyName);
        }

        let pattern = Pattern::compile(pattern).map_err(|source| ConfigError::InvalidPattern {
            behavior: name.clone(),
            source,
        })?;

        if actions.is_empty() {
            return Err(ConfigError::NoActions(name));
        }

        for action in &actions {
            if let Some(param) = action
                .referenced_params()
                .into_iter()
                .find(|param| !pattern.has_slot(param))
            {
                return Err(ConfigError::UnboundParameter {
                    behavior: name,
                    param: param.to_string(),
                });
            }
        }

        Ok(Self {
            name,
            pattern,
            actions,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn actions(&self) -> &[ActionTemplate] {
        &self.actions
    }
}

/// A successful registry lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryMatch<'a> {
    pub behavior: &'a BehaviorDefinition,
    pub binding: ParameterBinding,
}

#[derive(Debug, Clone, Default)]
pub struct BehaviorRegistry {
    behaviors: Vec<BehaviorDefinition>,
}

impl BehaviorRegistry {
    /// Build a registry, preserving definition order.
    pub fn load(definitions: Vec<BehaviorDefinition>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for definition in &definitions {
            if !seen.insert(definition.name.to_lowercase()) {
                return Err(ConfigError::DuplicateName(definition.name.clone()));
            }
        }
        Ok(Self {
            behaviors: definitions,
        })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.behaviors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }

    pub fn behaviors(&self) -> &[BehaviorDefinition] {
        &self.behaviors
    }

    pub fn get(&self, name: &str) -> Option<&BehaviorDefinition> {
        self.behaviors
            .iter()
            .find(|b| b.name.eq_ignore_ascii_case(name))
    }

    /// Find the most specific behavior matching `input`.
    pub fn match_input(&self, input: &str) -> Option<RegistryMatch<'_>> {
        let mut best: Option<RegistryMatch<'_>> = None;

        for behavior in &self.behaviors {
            let Some(binding) = behavior.pattern.match_input(input) else {
                continue;
            };
            // Strictly greater keeps the earlier definition on ties.
            let better = best.as_ref().map_or(true, |current| {
                behavior.pattern.specificity() > current.behavior.pattern.specificity()
            });
            if better {
                best = Some(RegistryMatch { behavior, binding });
            }
        }

        best
    }
}
