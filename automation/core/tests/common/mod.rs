// Copyright (c) 2026 Solon Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Shared fixtures: executors that record every call instead of touching the OS.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use solon_core::application::{RegistrySnapshot, StandardCommandProcessor};
use solon_core::domain::action::{DisplayId, WindowState};
use solon_core::domain::executor::{
    AppLauncher, DisplayProbe, ExecutorError, Executors, PortManager, RepositoryLocator,
    WindowManager,
};
use solon_core::domain::registry::{BehaviorRegistry, ConfigError};
use solon_core::domain::repository::{BehaviorSource, RuleSetSource};
use solon_core::domain::rules::DisplayRuleSet;
use solon_core::infrastructure::BehaviorParser;

/// Records calls in order; apps listed in `failing` make their calls fail.
#[derive(Default)]
pub struct Recorder {
    pub calls: Mutex<Vec<String>>,
    pub failing: Mutex<HashSet<String>>,
    pub running: Mutex<HashSet<String>>,
    pub login_items: Mutex<Vec<String>>,
    pub displays: Mutex<u32>,
    pub repos: Mutex<HashMap<String, PathBuf>>,
}

impl Recorder {
    pub fn new() -> Arc<Self> {
        let recorder = Self::default();
        *recorder.displays.lock() = 1;
        Arc::new(recorder)
    }

    pub fn fail_for(&self, app: &str) {
        self.failing.lock().insert(app.to_string());
    }

    pub fn add_repo(&self, name: &str, path: &str) {
        self.repos.lock().insert(name.to_string(), PathBuf::from(path));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    fn record(&self, app: &str, call: String) -> Result<(), ExecutorError> {
        self.calls.lock().push(call);
        if self.failing.lock().contains(app) {
            Err(ExecutorError::Failed(format!("{} refused", app)))
        } else {
            Ok(())
        }
    }

    pub fn executors(self: &Arc<Self>) -> Executors {
        Executors {
            apps: self.clone(),
            windows: self.clone(),
            ports: self.clone(),
            displays: self.clone(),
            repositories: self.clone(),
        }
    }
}

#[async_trait]
impl AppLauncher for Recorder {
    async fn launch(&self, app: &str, args: &[String]) -> Result<(), ExecutorError> {
        self.record(app, format!("launch {} {:?}", app, args))
    }

    async fn quit(&self, app: &str) -> Result<(), ExecutorError> {
        self.record(app, format!("quit {}", app))
    }

    async fn is_running(&self, app: &str) -> Result<bool, ExecutorError> {
        Ok(self.running.lock().contains(app))
    }

    async fn login_items(&self) -> Result<Vec<String>, ExecutorError> {
        Ok(self.login_items.lock().clone())
    }
}

#[async_trait]
impl WindowManager for Recorder {
    async fn move_windows(
        &self,
        app: &str,
        display: DisplayId,
        maximize: bool,
    ) -> Result<(), ExecutorError> {
        self.record(app, format!("move {} {} maximize={}", app, display, maximize))
    }

    async fn set_window_state(&self, app: &str, state: WindowState) -> Result<(), ExecutorError> {
        self.record(app, format!("state {} {:?}", app, state))
    }

    async fn close_windows_except(&self, app: &str, keep: &str) -> Result<usize, ExecutorError> {
        self.record(app, format!("close {} except {}", app, keep))
            .map(|_| 0)
    }
}

#[async_trait]
impl PortManager for Recorder {
    async fn kill_port(&self, port: u16, force: bool) -> Result<usize, ExecutorError> {
        self.record("port", format!("kill port {} force={}", port, force))
            .map(|_| 1)
    }
}

#[async_trait]
impl DisplayProbe for Recorder {
    async fn display_count(&self) -> Result<u32, ExecutorError> {
        Ok(*self.displays.lock())
    }
}

#[async_trait]
impl RepositoryLocator for Recorder {
    async fn locate(&self, name: &str) -> Option<PathBuf> {
        self.repos.lock().get(name).cloned()
    }
}

/// Behaviors held in memory; swap the YAML to simulate edits on disk.
pub struct InlineBehaviors {
    pub yaml: Mutex<String>,
}

impl InlineBehaviors {
    pub fn new(yaml: &str) -> Arc<Self> {
        Arc::new(Self {
            yaml: Mutex::new(yaml.to_string()),
        })
    }

    pub fn registry(&self) -> BehaviorRegistry {
        self.load().expect("fixture behaviors are valid")
    }
}

impl BehaviorSource for InlineBehaviors {
    fn load(&self) -> Result<BehaviorRegistry, ConfigError> {
        BehaviorRegistry::load(BehaviorParser::parse_yaml(&self.yaml.lock())?)
    }

    fn describe(&self) -> String {
        "inline".to_string()
    }
}

pub struct InlineRules(pub DisplayRuleSet);

impl RuleSetSource for InlineRules {
    fn load(&self) -> Result<DisplayRuleSet, ConfigError> {
        Ok(self.0.clone())
    }
}

pub fn processor(
    yaml: &str,
    rules: DisplayRuleSet,
    recorder: &Arc<Recorder>,
) -> (StandardCommandProcessor, Arc<InlineBehaviors>) {
    let behaviors = InlineBehaviors::new(yaml);
    let snapshot = Arc::new(RegistrySnapshot::new(behaviors.registry()));
    let processor = StandardCommandProcessor::new(
        snapshot,
        behaviors.clone(),
        Arc::new(InlineRules(rules)),
        recorder.executors(),
    );
    (processor, behaviors)
}
