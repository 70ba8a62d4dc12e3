//! Status command handlers
//!
//! Shows the signals the runner polls: the status check rollup of a pull
//! request and the check runs on a merge commit.

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use dora_core::domain::PollOutcome;
use dora_core::domain::status::{classify_check_run, classify_named_run, classify_rollup};

use crate::config::Config;

/// Status subcommands
#[derive(Subcommand)]
pub enum StatusCommands {
    /// Show the status check rollup of a pull request
    Checks {
        /// Pull request number
        number: u64,
    },
    /// Show the check runs of a commit and the deploy workflow verdict
    Deploy {
        /// Commit SHA
        sha: String,

        /// Name of the deploy workflow job
        #[arg(long, env = "DEPLOY_CHECK_NAME", default_value = "deploy")]
        check: String,
    },
}

/// Handle status commands
///
/// # Arguments
/// * `command` - The status command to execute
/// * `config` - The CLI configuration
pub async fn handle_status_command(command: StatusCommands, config: &Config) -> Result<()> {
    let client = config.client()?;

    match command {
        StatusCommands::Checks { number } => {
            let rollup = client.status_check_rollup(number).await?;
            let outcome = rollup
                .as_deref()
                .map(classify_rollup)
                .unwrap_or(PollOutcome::Pending);

            println!("{}", format!("PR #{}", number).bold());
            println!(
                "  Rollup:  {}",
                rollup.as_deref().unwrap_or("none reported").dimmed()
            );
            println!("  Outcome: {}", colorize_outcome(&outcome));
            Ok(())
        }
        StatusCommands::Deploy { sha, check } => {
            let runs = client.commit_check_runs(&sha).await?;

            println!("{}", format!("Commit {}", sha).bold());
            if runs.is_empty() {
                println!("{}", "  No check runs reported.".yellow());
            }
            for run in &runs {
                let outcome = classify_check_run(&run.status, run.conclusion.as_deref());
                println!("  {} {:<24} {}", "▸".cyan(), run.name, colorize_outcome(&outcome));
            }

            println!();
            println!(
                "  {} workflow: {}",
                check,
                colorize_outcome(&classify_named_run(&runs, &check))
            );
            Ok(())
        }
    }
}

/// Colorize a poll outcome for display
fn colorize_outcome(outcome: &PollOutcome) -> ColoredString {
    let text = outcome.to_string();
    match outcome {
        PollOutcome::Pending => text.yellow(),
        PollOutcome::Success => text.green(),
        PollOutcome::Failure(_) => text.red(),
        PollOutcome::Unknown(_) => text.magenta(),
    }
}
