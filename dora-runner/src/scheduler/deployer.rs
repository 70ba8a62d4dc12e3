//! Deployment scheduler
//!
//! Drives the simulated team. Every cycle asks GitHub for the last
//! deployment, decides whether the team is due, and if so ships one change
//! end to end:
//!
//! ```text
//! last deployment ─▶ decide ─▶ wait ─▶ push + PR ─▶ PR checks ─▶ merge ─▶ deploy workflow
//!                      └─ skip ─▶ wait recheck interval
//! ```
//!
//! Any failure ends the loop; cancellation ends it cleanly.

use chrono::Utc;
use dora_core::domain::PerformanceTier;
use dora_core::{RandomSource, minutes_until_next_deployment};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span};

use crate::config::Config;
use crate::error::RunnerError;
use crate::repository::Repositories;
use crate::scheduler::poller::{
    DeploymentWorkflowProbe, PollSettings, PullRequestChecksProbe, poll_until_terminal,
};
use crate::service::ChangeService;

/// Result of a single scheduling cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The team was not due; nothing was shipped
    Skipped,

    /// A change was merged and its deploy workflow succeeded
    Deployed { pull_request: u64, sha: String },
}

/// Scheduler that ships changes at the cadence of a performance tier
pub struct DeploymentScheduler {
    tier: PerformanceTier,
    repo: String,
    settings: PollSettings,
    recheck_interval: Duration,
    deploy_check_name: String,
    repositories: Repositories,
    changes: Arc<dyn ChangeService>,
    rng: Box<dyn RandomSource + Send>,
}

impl DeploymentScheduler {
    /// Creates a new scheduler
    ///
    /// # Arguments
    /// * `config` - Tier, timings and check name
    /// * `repositories` - GitHub reads and writes
    /// * `changes` - Producer of the changes that get shipped
    /// * `rng` - Source of the random delays
    pub fn new(
        config: &Config,
        repositories: Repositories,
        changes: Arc<dyn ChangeService>,
        rng: Box<dyn RandomSource + Send>,
    ) -> Self {
        Self {
            tier: config.tier,
            repo: format!("{}/{}", config.org, config.repo_name),
            settings: PollSettings {
                timeout: config.poll_timeout,
                tick: config.poll_interval,
            },
            recheck_interval: config.recheck_interval,
            deploy_check_name: config.deploy_check_name.clone(),
            repositories,
            changes,
            rng,
        }
    }

    /// Runs cycles until one fails or `cancel` fires
    ///
    /// Cancellation is a clean exit and returns `Ok`.
    pub async fn run(&mut self, cancel: &CancellationToken) -> Result<(), RunnerError> {
        info!(
            "Simulating a {} team (deploys every {}-{} minutes)",
            self.tier.level, self.tier.interval.lower_bound, self.tier.interval.upper_bound
        );

        loop {
            match self.run_cycle(cancel).await {
                Ok(CycleOutcome::Skipped) => {}
                Ok(CycleOutcome::Deployed { pull_request, sha }) => {
                    info!("Deployed PR #{} ({})", pull_request, sha);
                }
                Err(RunnerError::Cancelled) => {
                    info!("Shutting down");
                    return Ok(());
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Runs one cycle: decide, then either wait out a skip or ship a change
    pub async fn run_cycle(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<CycleOutcome, RunnerError> {
        let last = self
            .repositories
            .deployments
            .last_deployment()
            .await
            .map_err(|source| RunnerError::Query {
                repo: self.repo.clone(),
                source,
            })?;

        let last_deploy = last.map(|record| record.created_at);
        let decision =
            minutes_until_next_deployment(&self.tier, last_deploy, Utc::now(), &mut *self.rng);
        debug!("Last deployment {:?}, decision {:?}", last_deploy, decision);

        let Some(delay) = decision.delay() else {
            info!(
                "Too soon since the last deployment, checking again in {:?}",
                self.recheck_interval
            );
            sleep_or_cancel(self.recheck_interval, cancel).await?;
            return Ok(CycleOutcome::Skipped);
        };

        info!("Next deployment in {:?}", delay);
        sleep_or_cancel(delay, cancel).await?;
        self.ship(cancel).await
    }

    /// Pushes a change and follows it through to a successful deployment
    async fn ship(&self, cancel: &CancellationToken) -> Result<CycleOutcome, RunnerError> {
        let change = self
            .changes
            .trigger_change()
            .await
            .map_err(|e| RunnerError::Change(e.into()))?;
        let number = change.pull_request.number;

        let checks =
            PullRequestChecksProbe::new(self.repositories.pull_requests.clone(), number);
        let merge = async {
            poll_until_terminal(&checks, self.settings, cancel).await?;

            self.changes
                .merge_change(&change)
                .await
                .map_err(|e| RunnerError::Merge {
                    number,
                    source: e.into(),
                })
        }
        .instrument(info_span!("pull_request", number))
        .await?;

        let workflow = DeploymentWorkflowProbe::new(
            self.repositories.commits.clone(),
            merge.merge_commit_sha.clone(),
            self.deploy_check_name.clone(),
        );
        poll_until_terminal(&workflow, self.settings, cancel)
            .instrument(info_span!("deploy", sha = %merge.merge_commit_sha))
            .await?;

        Ok(CycleOutcome::Deployed {
            pull_request: number,
            sha: merge.merge_commit_sha,
        })
    }
}

/// Sleeps for `duration` unless `cancel` fires first
async fn sleep_or_cancel(duration: Duration, cancel: &CancellationToken) -> Result<(), RunnerError> {
    tokio::select! {
        biased;

        _ = cancel.cancelled() => Err(RunnerError::Cancelled),
        _ = tokio::time::sleep(duration) => Ok(()),
    }
}
