// Copyright (c) 2026 Solon Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::{Path, PathBuf};

use solon_core::domain::repository::RuleSetSource;
use solon_core::infrastructure::{BehaviorParser, JsonRuleStore};

use crate::GlobalOptions;

const CONFIG_TEMPLATE: &str = include_str!("../../templates/config.yaml");
const BEHAVIORS_TEMPLATE: &str = include_str!("../../templates/behaviors.yaml");
const RULES_TEMPLATE: &str = include_str!("../../templates/app_rules.json");

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration and loaded behaviors
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,
    },

    /// Validate the daemon config, behaviors file and rules file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate a sample configuration
    Generate {
        /// Output path
        #[arg(short, long, default_value = "./solon-config.yaml")]
        output: PathBuf,

        /// Also write sample behaviors.yaml and app_rules.json into this directory
        #[arg(long, value_name = "DIR")]
        samples: Option<PathBuf>,

        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },
}

pub async fn handle_command(command: ConfigCommand, options: &GlobalOptions) -> Result<()> {
    match command {
        ConfigCommand::Show { paths } => show(options, paths),
        ConfigCommand::Validate { file } => {
            let options = GlobalOptions {
                config: file.or_else(|| options.config.clone()),
                ..options.clone()
            };
            validate(&options)
        }
        ConfigCommand::Generate {
            output,
            samples,
            force,
        } => generate(&output, samples.as_deref(), force),
    }
}

fn show(options: &GlobalOptions, show_paths: bool) -> Result<()> {
    let config = options.load_config()?;
    let spec = &config.spec;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        match &options.config {
            Some(path) => println!("  1. --config flag: {}", path.display()),
            None => println!("  1. --config flag: {}", "(not set)".dimmed()),
        }
        println!(
            "  2. SOLON_CONFIG_PATH: {}",
            std::env::var("SOLON_CONFIG_PATH")
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./solon-config.yaml");
        println!("  4. ~/.solon/config.yaml");
        println!("  5. /etc/solon/config.yaml");
        println!();
    }

    println!("{}", "Current configuration:".bold());
    println!();
    println!("  Socket: {}", spec.socket_path().display());
    println!("  Behaviors file: {}", spec.behaviors_path().display());
    println!("  Rules file: {}", spec.rules_path().display());
    println!(
        "  Repository roots: {} (depth {})",
        spec.repository_roots()
            .iter()
            .map(|root| root.display().to_string())
            .collect::<Vec<_>>()
            .join(", "),
        spec.repositories.max_depth
    );
    println!(
        "  IPC: read timeout {}ms, max line {} bytes",
        spec.ipc.read_timeout_ms, spec.ipc.max_line_bytes
    );
    println!(
        "  Display monitor: {} (every {}s)",
        if spec.display_monitor.enabled { "enabled" } else { "disabled" },
        spec.display_monitor.poll_interval_secs
    );
    println!("  Startup rules: {}", if spec.startup.apply_rules { "applied" } else { "skipped" });
    println!("  Logging: {} ({})", spec.logging.level, spec.logging.format);
    println!();

    println!("{}", "Behaviors:".bold());
    match BehaviorParser::load_registry(&spec.behaviors_path()) {
        Ok(registry) if registry.is_empty() => println!("  {}", "(none)".dimmed()),
        Ok(registry) => {
            for behavior in registry.behaviors() {
                println!(
                    "  {} {} ({} actions)",
                    behavior.name().bold(),
                    behavior.pattern().as_str().dimmed(),
                    behavior.actions().len()
                );
            }
        }
        Err(e) => println!("  {}", format!("✗ {}", e).red()),
    }
    println!();

    Ok(())
}

fn validate(options: &GlobalOptions) -> Result<()> {
    println!("Validating configuration...");

    let config = options.load_config()?;
    config.validate().context("Configuration validation failed")?;
    println!("{}", "✓ Daemon configuration is valid".green());

    let behaviors_path = config.spec.behaviors_path();
    let registry = BehaviorParser::load_registry(&behaviors_path)
        .with_context(|| format!("Invalid behaviors file {:?}", behaviors_path))?;
    println!(
        "{}",
        format!("✓ {} behaviors in {}", registry.len(), behaviors_path.display()).green()
    );

    let rules_path = config.spec.rules_path();
    let rules = JsonRuleStore::new(&rules_path)
        .load()
        .with_context(|| format!("Invalid rules file {:?}", rules_path))?;
    println!(
        "{}",
        format!(
            "✓ {} display rule lists in {}",
            rules.display_rules.len(),
            rules_path.display()
        )
        .green()
    );

    Ok(())
}

fn generate(output: &Path, samples: Option<&Path>, force: bool) -> Result<()> {
    write_sample(output, CONFIG_TEMPLATE, force)?;

    if let Some(dir) = samples {
        std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;
        write_sample(&dir.join("behaviors.yaml"), BEHAVIORS_TEMPLATE, force)?;
        write_sample(&dir.join("app_rules.json"), RULES_TEMPLATE, force)?;
    }

    Ok(())
}

fn write_sample(path: &Path, content: &str, force: bool) -> Result<()> {
    if path.exists() && !force {
        println!(
            "{}",
            format!("ℹ {} exists, skipping (use --force to overwrite)", path.display()).yellow()
        );
        return Ok(());
    }
    std::fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))?;
    println!("{}", format!("✓ Generated: {}", path.display()).green());
    Ok(())
}

#[cfg(test)]
mod tests {
    use solon_core::domain::daemon_config::DaemonConfigManifest;

    use super::*;

    #[test]
    fn bundled_samples_are_valid() {
        let config = DaemonConfigManifest::from_yaml_str(CONFIG_TEMPLATE).unwrap();
        config.validate().unwrap();

        let behaviors = BehaviorParser::parse_yaml(BEHAVIORS_TEMPLATE).unwrap();
        assert_eq!(behaviors.len(), 4);

        let dir = tempfile::tempdir().unwrap();
        let rules_path = dir.path().join("app_rules.json");
        std::fs::write(&rules_path, RULES_TEMPLATE).unwrap();
        let rules = JsonRuleStore::new(&rules_path).load().unwrap();
        assert_eq!(rules.display_rules.len(), 3);
    }

    #[test]
    fn generate_does_not_clobber_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("solon-config.yaml");
        std::fs::write(&output, "keep me").unwrap();

        generate(&output, Some(&dir.path().join("samples")), false).unwrap();
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "keep me");
        assert!(dir.path().join("samples/behaviors.yaml").exists());

        generate(&output, None, true).unwrap();
        assert_eq!(std::fs::read_to_string(&output).unwrap(), CONFIG_TEMPLATE);
    }
}
