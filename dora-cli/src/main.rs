//! Dora CLI
//!
//! Command-line interface for inspecting a simulated team: the tier
//! catalog, the next cadence decision and the GitHub checks the runner
//! waits on.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;

#[derive(Parser)]
#[command(name = "dora")]
#[command(about = "Dora the Explorer: DORA team simulator CLI", long_about = None)]
struct Cli {
    /// GitHub GraphQL endpoint
    #[arg(
        long,
        env = "GH_GRAPHQL_URL",
        default_value = "https://api.github.com/graphql"
    )]
    graphql_url: String,

    /// Personal access token
    #[arg(long, env = "GH_PAT", hide_env_values = true)]
    token: Option<String>,

    /// Organisation owning the repository
    #[arg(long, env = "GH_ORG")]
    org: Option<String>,

    /// Repository name
    #[arg(long, env = "GH_REPO_NAME")]
    repo: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config {
        graphql_url: cli.graphql_url,
        token: cli.token,
        org: cli.org,
        repo: cli.repo,
    };

    handle_command(cli.command, &config).await
}
