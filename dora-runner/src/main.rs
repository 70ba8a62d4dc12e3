//! Dora Runner
//!
//! Simulates a software team deploying at the cadence of a DORA
//! performance tier.
//!
//! Architecture:
//! - Configuration: Load settings from environment variables
//! - Repositories: GraphQL communication with GitHub (deployments, PRs, checks)
//! - Services: Change generation in a local git clone
//! - Scheduler: Cadence decisions and waits on status checks and deployments
//!
//! The runner looks up the last deployment, waits until the team is due,
//! pushes a change, merges it once its checks pass and waits for it to
//! deploy. Then it starts over.

mod config;
mod error;
mod repository;
mod scheduler;
mod service;

use anyhow::Result;
use dora_client::{GitHubClient, RepositoryRef};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, info_span, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::repository::Repositories;
use crate::scheduler::DeploymentScheduler;
use crate::service::GitChangeService;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dora_runner=info,dora_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Dora the Explorer");

    let config = Config::load()?;
    info!(
        "Loaded configuration: repo={}/{}, level={}, graphql_url={}",
        config.org, config.repo_name, config.tier.level, config.graphql_url
    );

    let client = Arc::new(GitHubClient::new(
        config.graphql_url.clone(),
        config.token.clone(),
        RepositoryRef::new(config.org.clone(), config.repo_name.clone()),
    ));
    let repositories = Repositories::github(client);
    let changes = Arc::new(GitChangeService::new(
        &config,
        repositories.pull_requests.clone(),
    ));

    info!(
        "Poll timeout: {:?}, poll interval: {:?}, recheck interval: {:?}",
        config.poll_timeout, config.poll_interval, config.recheck_interval
    );

    let mut scheduler = DeploymentScheduler::new(
        &config,
        repositories,
        changes,
        Box::new(StdRng::from_entropy()),
    );

    let cancel = CancellationToken::new();
    spawn_shutdown_listener(cancel.clone());

    let span = info_span!(
        "team",
        repo = %format!("{}/{}", config.org, config.repo_name),
        level = %config.tier.level
    );

    if let Err(e) = scheduler.run(&cancel).instrument(span).await {
        let e = anyhow::Error::from(e);
        error!("Runner stopped: {:#}", e);
        return Err(e);
    }

    Ok(())
}

/// Cancels `cancel` on Ctrl-C
fn spawn_shutdown_listener(cancel: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received Ctrl-C");
                cancel.cancel();
            }
            Err(e) => warn!("Failed to listen for Ctrl-C: {}", e),
        }
    });
}
