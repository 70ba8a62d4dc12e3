//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod status;
mod tier;

pub use status::StatusCommands;
pub use tier::TierCommands;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Performance tiers and cadence
    Tier {
        #[command(subcommand)]
        command: TierCommands,
    },
    /// Pull request checks and deploy workflows
    Status {
        #[command(subcommand)]
        command: StatusCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
///
/// # Returns
/// Result indicating success or failure
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Tier { command } => tier::handle_tier_command(command, config).await,
        Commands::Status { command } => status::handle_status_command(command, config).await,
    }
}
