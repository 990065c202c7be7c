// Copyright (c) 2026 Solon Contributors
// SPDX-License-Identifier: AGPL-3.0

//! # Solon CLI
//!
//! The `solon` binary is both the automation daemon and its client.
//!
//! - **Client mode**: `solon open cursor lucifer` sends the text to the daemon
//!   socket and prints the result; the exit code is 0 only on success
//! - **Daemon mode**: `solon --daemon` runs the listener in the foreground
//!
//! ## Commands
//!
//! - `solon daemon start|stop|status|install|uninstall` - Manage daemon lifecycle
//! - `solon config show|validate|generate` - Configuration management

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing::info;

use solon_cli::commands::{self, ConfigCommand, DaemonCommand};
use solon_cli::daemon;
use solon_cli::GlobalOptions;

/// Solon - personal automation daemon
#[derive(Parser)]
#[command(name = "solon")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Run as the daemon (foreground; use `solon daemon start` to background it)
    #[arg(long, global = true)]
    daemon: bool,

    /// Path to configuration file (overrides discovery)
    #[arg(short, long, global = true, env = "SOLON_CONFIG_PATH", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Unix socket path (overrides the configured socket)
    #[arg(long, global = true, env = "SOLON_SOCKET_PATH", value_name = "PATH")]
    socket: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "SOLON_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,

    /// Command text to send to the daemon, e.g. `open cursor lucifer`
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "COMMAND")]
    words: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage daemon lifecycle
    #[command(name = "daemon")]
    Daemon {
        #[command(subcommand)]
        command: DaemonCommand,
    },

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let options = GlobalOptions {
        config: cli.config,
        socket: cli.socket,
        log_level: cli.log_level,
    };

    // Handle daemon mode
    if cli.daemon {
        let config = options.load_config()?;
        let level = options
            .log_level
            .clone()
            .unwrap_or_else(|| config.spec.logging.level.clone());
        init_logging(&level, &config.spec.logging.format)?;
        info!("Starting Solon in daemon mode");
        return daemon::start_daemon(config).await;
    }

    init_logging(options.log_level.as_deref().unwrap_or("warn"), "text")?;

    match cli.command {
        Some(Commands::Daemon { command }) => {
            commands::daemon::handle_command(command, &options).await
        }
        Some(Commands::Config { command }) => {
            commands::config::handle_command(command, &options).await
        }
        None if !cli.words.is_empty() => {
            let code = commands::send::run(&cli.words, &options).await?;
            std::process::exit(code);
        }
        None => {
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(commands::send::EXIT_FAILED);
        }
    }
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str, format: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if format == "json" {
        builder.json().init();
    } else {
        builder.compact().init();
    }

    Ok(())
}
