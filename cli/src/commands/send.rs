// Copyright (c) 2026 Solon Contributors
// SPDX-License-Identifier: AGPL-3.0

//! Forwarding free-form command text to the daemon.

use colored::Colorize;

use solon_core::domain::result::CommandResult;
use solon_core::presentation::ClientError;

use crate::daemon::DaemonClient;
use crate::GlobalOptions;

/// Exit code when the command ran and every action succeeded.
pub const EXIT_OK: i32 = 0;
/// Exit code when the daemon answered with a failure.
pub const EXIT_FAILED: i32 = 1;
/// Exit code when the daemon could not be reached or answered garbage.
pub const EXIT_UNREACHABLE: i32 = 2;

pub fn exit_code(outcome: &Result<CommandResult, ClientError>) -> i32 {
    match outcome {
        Ok(result) if result.success => EXIT_OK,
        Ok(_) => EXIT_FAILED,
        Err(_) => EXIT_UNREACHABLE,
    }
}

/// Send `words` as one command and print the outcome. Returns the exit code.
pub async fn run(words: &[String], options: &GlobalOptions) -> anyhow::Result<i32> {
    let config = options.load_config()?;
    let client = DaemonClient::new(config.spec.socket_path());

    let command = words.join(" ");
    let outcome = client.send(&command).await;
    print_outcome(&outcome);
    Ok(exit_code(&outcome))
}

fn print_outcome(outcome: &Result<CommandResult, ClientError>) {
    match outcome {
        Ok(result) => {
            if result.success {
                println!("{}", format!("✓ {}", result.message).green());
            } else {
                println!("{}", format!("✗ {}", result.message).red());
            }
            for action in &result.actions {
                match &action.error {
                    None if action.success => println!("  {} {}", "✓".green(), action.kind),
                    error => println!(
                        "  {} {}: {}",
                        "✗".red(),
                        action.kind,
                        error.as_deref().unwrap_or("failed")
                    ),
                }
            }
        }
        Err(e @ ClientError::Connect { .. }) => {
            eprintln!("{}", format!("✗ {}", e).red());
            eprintln!("Start it with: solon daemon start");
        }
        Err(e) => eprintln!("{}", format!("✗ {}", e).red()),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use solon_core::domain::result::ActionOutcome;

    use super::*;

    #[test]
    fn exit_code_follows_success() {
        assert_eq!(exit_code(&Ok(CommandResult::ok("reloaded 3 behaviors"))), EXIT_OK);
        assert_eq!(exit_code(&Ok(CommandResult::no_match())), EXIT_FAILED);

        let partial = CommandResult::from_outcomes(
            "morning",
            vec![
                ActionOutcome::succeeded("launch_app"),
                ActionOutcome::failed("move_window", "no windows"),
            ],
        );
        assert_eq!(exit_code(&Ok(partial)), EXIT_FAILED);

        assert_eq!(
            exit_code(&Err(ClientError::Timeout(Duration::from_secs(1)))),
            EXIT_UNREACHABLE
        );
    }
}
