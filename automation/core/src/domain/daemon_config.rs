// Copyright (c) 2026 Solon Contributors
// SPDX-License-Identifier: AGPL-3.0

// Daemon Configuration Types
//
// Defines the configuration schema for the Solon daemon:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - IPC socket location and per-connection limits
// - Behaviors and rules file locations
// - Repository search roots
// - Display monitor and startup settings
// - Logging

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const API_VERSION: &str = "solon.dev/v1";
pub const KIND: &str = "DaemonConfig";

/// Top-level daemon configuration manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfigManifest {
    /// API version (must be "solon.dev/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "DaemonConfig")
    pub kind: String,

    pub metadata: ManifestMetadata,

    #[serde(default)]
    pub spec: DaemonConfigSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
}

/// Content under `spec:`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonConfigSpec {
    /// Unix socket the daemon listens on
    #[serde(default = "default_socket_path")]
    pub socket_path: String,

    /// Behavior definitions (YAML)
    #[serde(default = "default_behaviors_file")]
    pub behaviors_file: String,

    /// Display and startup rules (JSON)
    #[serde(default = "default_rules_file")]
    pub rules_file: String,

    #[serde(default)]
    pub repositories: RepositoryConfig,

    #[serde(default)]
    pub ipc: IpcConfig,

    #[serde(default)]
    pub display_monitor: DisplayMonitorConfig,

    #[serde(default)]
    pub startup: StartupConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Directories searched for repositories by name
    #[serde(default = "default_repository_roots")]
    pub roots: Vec<String>,

    /// How deep below each root to look
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcConfig {
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,

    #[serde(default = "default_max_line_bytes")]
    pub max_line_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayMonitorConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartupConfig {
    /// Dispatch `apply startup rules` once the listener is up
    #[serde(default = "default_true")]
    pub apply_rules: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "info", "debug", "trace")
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format ("json" or "text")
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_socket_path() -> String {
    "/tmp/solon.sock".to_string()
}

fn default_behaviors_file() -> String {
    "~/.solon/behaviors.yaml".to_string()
}

fn default_rules_file() -> String {
    "~/.solon/app_rules.json".to_string()
}

fn default_repository_roots() -> Vec<String> {
    vec!["~/Desktop".to_string()]
}

fn default_max_depth() -> usize {
    3
}

fn default_read_timeout_ms() -> u64 {
    5_000
}

fn default_max_line_bytes() -> usize {
    64 * 1024
}

fn default_poll_interval_secs() -> u64 {
    2
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            roots: default_repository_roots(),
            max_depth: default_max_depth(),
        }
    }
}

impl Default for IpcConfig {
    fn default() -> Self {
        Self {
            read_timeout_ms: default_read_timeout_ms(),
            max_line_bytes: default_max_line_bytes(),
        }
    }
}

impl Default for DisplayMonitorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self { apply_rules: true }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for DaemonConfigSpec {
    fn default() -> Self {
        Self {
            socket_path: default_socket_path(),
            behaviors_file: default_behaviors_file(),
            rules_file: default_rules_file(),
            repositories: RepositoryConfig::default(),
            ipc: IpcConfig::default(),
            display_monitor: DisplayMonitorConfig::default(),
            startup: StartupConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for DaemonConfigManifest {
    fn default() -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ManifestMetadata {
                name: "solon".to_string(),
                version: Some("1.0.0".to_string()),
                labels: None,
            },
            spec: DaemonConfigSpec::default(),
        }
    }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl DaemonConfigSpec {
    pub fn socket_path(&self) -> PathBuf {
        expand_home(&self.socket_path)
    }

    pub fn behaviors_path(&self) -> PathBuf {
        expand_home(&self.behaviors_file)
    }

    pub fn rules_path(&self) -> PathBuf {
        expand_home(&self.rules_file)
    }

    pub fn repository_roots(&self) -> Vec<PathBuf> {
        self.repositories
            .roots
            .iter()
            .map(|root| expand_home(root))
            .collect()
    }
}

impl DaemonConfigManifest {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover configuration file using precedence order
    /// 1. SOLON_CONFIG_PATH environment variable
    /// 2. ./solon-config.yaml (working directory)
    /// 3. ~/.solon/config.yaml (user home)
    /// 4. /etc/solon/config.yaml (system)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("SOLON_CONFIG_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./solon-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".solon").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        let system_config = PathBuf::from("/etc/solon/config.yaml");
        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // Explicit path must exist and parse
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path)
                .map_err(|e| anyhow::anyhow!("Failed to load config at {:?}: {}", path, e))?;
            config.apply_env_overrides();
            return Ok(config);
        }

        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(&config_path)
                .map_err(|e| anyhow::anyhow!("Failed to load config at {:?}: {}", config_path, e))?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::warn!("No configuration file found in standard locations. Using defaults.");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("SOLON_SOCKET_PATH").filter(|p| !p.is_empty()) {
            tracing::info!("Environment override: SOLON_SOCKET_PATH={}", path);
            self.spec.socket_path = path;
        }

        if let Some(path) = lookup("SOLON_BEHAVIORS_PATH").filter(|p| !p.is_empty()) {
            tracing::info!("Environment override: SOLON_BEHAVIORS_PATH={}", path);
            self.spec.behaviors_file = path;
        }

        if let Some(path) = lookup("SOLON_RULES_PATH").filter(|p| !p.is_empty()) {
            tracing::info!("Environment override: SOLON_RULES_PATH={}", path);
            self.spec.rules_file = path;
        }

        if let Some(val) = lookup("SOLON_DISPLAY_MONITOR") {
            match parse_flag(&val) {
                Some(enabled) => {
                    tracing::info!("Environment override: SOLON_DISPLAY_MONITOR={}", enabled);
                    self.spec.display_monitor.enabled = enabled;
                }
                None => {
                    tracing::warn!(
                        "Invalid value for SOLON_DISPLAY_MONITOR: '{}'. Expected true/false. Ignoring.",
                        val
                    );
                }
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_version != API_VERSION {
            anyhow::bail!(
                "Invalid apiVersion: '{}'. Must be '{}'",
                self.api_version,
                API_VERSION
            );
        }

        if self.kind != KIND {
            anyhow::bail!("Invalid kind: '{}'. Must be '{}'", self.kind, KIND);
        }

        if self.metadata.name.is_empty() {
            anyhow::bail!("metadata.name cannot be empty");
        }

        if self.spec.socket_path.trim().is_empty() {
            anyhow::bail!("spec.socket_path cannot be empty");
        }

        if self.spec.behaviors_file.trim().is_empty() {
            anyhow::bail!("spec.behaviors_file cannot be empty");
        }

        if self.spec.rules_file.trim().is_empty() {
            anyhow::bail!("spec.rules_file cannot be empty");
        }

        if self.spec.ipc.read_timeout_ms == 0 {
            anyhow::bail!("spec.ipc.read_timeout_ms must be greater than zero");
        }

        if self.spec.ipc.max_line_bytes == 0 {
            anyhow::bail!("spec.ipc.max_line_bytes must be greater than zero");
        }

        if self.spec.display_monitor.poll_interval_secs == 0 {
            anyhow::bail!("spec.display_monitor.poll_interval_secs must be greater than zero");
        }

        if !matches!(self.spec.logging.format.as_str(), "text" | "json") {
            anyhow::bail!(
                "spec.logging.format must be 'text' or 'json', got '{}'",
                self.spec.logging.format
            );
        }

        Ok(())
    }
}
